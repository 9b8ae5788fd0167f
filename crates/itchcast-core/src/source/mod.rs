//! Frame sources for replay and offline decoding.
//!
//! A source yields whole wire records: the 2-byte length prefix followed by
//! the payload, exactly as they travel in one multicast datagram. Replay
//! forwards them verbatim; offline decoding runs them through the frame
//! extractor like a live datagram.

mod capture;
mod pcap;
mod udp;

pub use capture::CaptureSource;
pub use pcap::PcapDatagramSource;

use std::path::Path;

use thiserror::Error;

pub trait FrameSource {
    /// Next record, or `None` at end of stream.
    fn next_record(&mut self) -> Result<Option<Vec<u8>>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("incomplete record at byte {offset}: need {needed} bytes, got {available}")]
    Incomplete {
        offset: u64,
        needed: usize,
        available: usize,
    },
    #[error("PCAP parse error: {0}")]
    Pcap(String),
}

/// Open a recorded feed, choosing the reader by file extension.
///
/// `.pcap`/`.pcapng` captures yield the UDP payloads they contain (optionally
/// only those sent to `udp_port`); anything else is read as a raw
/// length-prefixed capture.
pub fn open_capture(
    path: &Path,
    udp_port: Option<u16>,
) -> Result<Box<dyn FrameSource>, SourceError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext == "pcap" || ext == "pcapng" {
        Ok(Box::new(PcapDatagramSource::open(path, udp_port)?))
    } else {
        Ok(Box::new(CaptureSource::open(path)?))
    }
}
