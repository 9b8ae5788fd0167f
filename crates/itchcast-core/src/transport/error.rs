use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to create UDP socket: {0}")]
    Socket(std::io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("failed to join multicast group {group} on {interface}: {source}")]
    Join {
        group: Ipv4Addr,
        interface: Ipv4Addr,
        source: std::io::Error,
    },
    #[error("failed to set socket option {option}: {source}")]
    Configure {
        option: &'static str,
        source: std::io::Error,
    },
    #[error("not a multicast address: {0}")]
    NotMulticast(Ipv4Addr),
    #[error("receive failed: {0}")]
    Receive(std::io::Error),
    #[error("send to {dest} failed: {source}")]
    Send {
        dest: SocketAddr,
        source: std::io::Error,
    },
    #[error("short send to {dest}: {sent} of {len} bytes")]
    ShortSend {
        dest: SocketAddr,
        sent: usize,
        len: usize,
    },
}
