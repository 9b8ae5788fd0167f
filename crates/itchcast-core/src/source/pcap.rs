//! PCAP/PCAPNG captures of the multicast feed.
//!
//! Every UDP datagram in the capture carries one length-prefixed record, so
//! payloads are yielded unchanged. Other traffic is skipped.

use std::fs::File;
use std::path::Path;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{Block, Linktype, PcapBlockOwned, PcapError, create_reader};
use tracing::debug;

use super::udp::udp_payload;
use super::{FrameSource, SourceError};

const READER_BUFFER_LEN: usize = 65_536;

/// Yields the UDP payloads of a capture as feed records.
pub struct PcapDatagramSource {
    reader: Box<dyn PcapReaderIterator>,
    // Legacy captures hold one entry from the file header; pcapng holds one
    // per interface description block of the current section.
    linktypes: Vec<Linktype>,
    udp_port: Option<u16>,
    skipped: u64,
}

impl PcapDatagramSource {
    /// Open a capture; with `udp_port` set, only datagrams sent to that port
    /// are yielded.
    pub fn open(path: &Path, udp_port: Option<u16>) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let reader =
            create_reader(READER_BUFFER_LEN, file).map_err(|err| pcap_error("open", err))?;
        Ok(Self {
            reader,
            linktypes: Vec::new(),
            udp_port,
            skipped: 0,
        })
    }

    fn next_packet(&mut self) -> Result<Option<(Linktype, Vec<u8>)>, SourceError> {
        loop {
            let (consumed, packet) = match self.reader.next() {
                Ok((consumed, block)) => (consumed, packet_from_block(&mut self.linktypes, block)),
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    self.reader
                        .refill()
                        .map_err(|err| pcap_error("refill", err))?;
                    continue;
                }
                Err(err) => return Err(pcap_error("read", err)),
            };
            self.reader.consume(consumed);
            if packet.is_some() {
                return Ok(packet);
            }
        }
    }
}

impl FrameSource for PcapDatagramSource {
    fn next_record(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        while let Some((linktype, data)) = self.next_packet()? {
            match udp_payload(linktype, &data) {
                Ok(Some(udp)) if self.udp_port.is_none_or(|port| port == udp.dst_port) => {
                    return Ok(Some(udp.payload.to_vec()));
                }
                Ok(_) => self.skipped += 1,
                Err(err) => {
                    self.skipped += 1;
                    debug!(error = %err, "skipping undecodable packet");
                }
            }
        }
        debug!(skipped = self.skipped, "capture exhausted");
        Ok(None)
    }
}

fn packet_from_block(
    linktypes: &mut Vec<Linktype>,
    block: PcapBlockOwned<'_>,
) -> Option<(Linktype, Vec<u8>)> {
    match block {
        PcapBlockOwned::LegacyHeader(header) => {
            linktypes.clear();
            linktypes.push(header.network);
            None
        }
        PcapBlockOwned::Legacy(packet) => Some((linktype_of(linktypes, 0), packet.data.to_vec())),
        PcapBlockOwned::NG(Block::SectionHeader(_)) => {
            linktypes.clear();
            None
        }
        PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
            linktypes.push(idb.linktype);
            None
        }
        PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
            Some((linktype_of(linktypes, epb.if_id), epb.data.to_vec()))
        }
        PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
            Some((linktype_of(linktypes, 0), spb.data.to_vec()))
        }
        _ => None,
    }
}

/// Unknown interfaces fall back to Ethernet.
fn linktype_of(linktypes: &[Linktype], if_id: u32) -> Linktype {
    usize::try_from(if_id)
        .ok()
        .and_then(|idx| linktypes.get(idx))
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

fn pcap_error(context: &str, err: impl std::fmt::Display) -> SourceError {
    SourceError::Pcap(format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_linktype_lookup() {
        let linktypes = [Linktype::RAW, Linktype::LINUX_SLL];
        assert_eq!(linktype_of(&linktypes, 1), Linktype::LINUX_SLL);
        assert_eq!(linktype_of(&linktypes, 5), Linktype::ETHERNET);
        assert_eq!(linktype_of(&[], 0), Linktype::ETHERNET);
    }

    #[test]
    fn raw_feed_with_pcap_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.pcap");
        std::fs::write(&path, [0x00, 0x03, b'Z', 0x01, 0x02, 0x00, 0x00, 0x00]).unwrap();
        assert!(matches!(
            PcapDatagramSource::open(&path, None),
            Err(SourceError::Pcap(_))
        ));
    }
}
