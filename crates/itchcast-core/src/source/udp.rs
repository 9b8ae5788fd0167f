//! Link-layer slicing down to the UDP payload.

use etherparse::{SlicedPacket, TransportSlice};
use pcap_parser::Linktype;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("cannot slice linktype {linktype} frame: {message}")]
pub struct SliceError {
    linktype: i32,
    message: String,
}

/// Destination port and payload of one captured UDP datagram.
pub struct UdpPayload<'a> {
    pub dst_port: u16,
    pub payload: &'a [u8],
}

/// Slice a captured frame down to its UDP payload.
///
/// `Ok(None)` for link types without a slicer and for non-UDP traffic.
pub fn udp_payload(linktype: Linktype, data: &[u8]) -> Result<Option<UdpPayload<'_>>, SliceError> {
    let sliced = match linktype {
        Linktype::ETHERNET => SlicedPacket::from_ethernet(data).map_err(|e| e.to_string()),
        Linktype::LINUX_SLL => SlicedPacket::from_linux_sll(data).map_err(|e| e.to_string()),
        Linktype::RAW => SlicedPacket::from_ip(data).map_err(|e| e.to_string()),
        _ => return Ok(None),
    }
    .map_err(|message| SliceError {
        linktype: linktype.0,
        message,
    })?;

    match sliced.transport {
        Some(TransportSlice::Udp(udp)) => Ok(Some(UdpPayload {
            dst_port: udp.destination_port(),
            payload: udp.payload(),
        })),
        _ => Ok(None),
    }
}
