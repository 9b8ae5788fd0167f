use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::info;

use super::error::TransportError;
use super::{DatagramReceiver, DatagramSender};

pub const DEFAULT_GROUP: Ipv4Addr = Ipv4Addr::new(239, 192, 0, 1);
pub const DEFAULT_PORT: u16 = 12345;
pub const DEFAULT_TTL: u32 = 1;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(250);
pub const RECEIVE_BUFFER_LEN: usize = 65_536;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulticastConfig {
    pub group: Ipv4Addr,
    pub port: u16,
    /// Local interface used to join the group and to send.
    pub interface: Ipv4Addr,
    pub ttl: u32,
    pub loopback: bool,
    /// `None` blocks indefinitely on receive.
    pub read_timeout: Option<Duration>,
}

impl Default for MulticastConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP,
            port: DEFAULT_PORT,
            interface: Ipv4Addr::UNSPECIFIED,
            ttl: DEFAULT_TTL,
            loopback: true,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

impl MulticastConfig {
    pub fn destination(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.group, self.port))
    }

    fn require_multicast(&self) -> Result<(), TransportError> {
        if !self.group.is_multicast() {
            return Err(TransportError::NotMulticast(self.group));
        }
        Ok(())
    }
}

/// Receiving side: bound to the group port and joined to the group.
pub struct MulticastReceiver {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl MulticastReceiver {
    pub fn join(config: &MulticastConfig) -> Result<Self, TransportError> {
        config.require_multicast()?;
        let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port));
        let socket = bind_shared(addr)?;
        socket
            .join_multicast_v4(&config.group, &config.interface)
            .map_err(|source| TransportError::Join {
                group: config.group,
                interface: config.interface,
                source,
            })?;
        let timeout = config.read_timeout.filter(|t| !t.is_zero());
        socket
            .set_read_timeout(timeout)
            .map_err(|source| TransportError::Configure {
                option: "SO_RCVTIMEO",
                source,
            })?;
        info!(group = %config.group, port = config.port, "joined multicast group");
        Ok(Self {
            socket,
            buffer: vec![0u8; RECEIVE_BUFFER_LEN],
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }
}

impl DatagramReceiver for MulticastReceiver {
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError> {
        match self.socket.recv(&mut self.buffer) {
            Ok(len) => Ok(Some(&self.buffer[..len])),
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(TransportError::Receive(err)),
        }
    }
}

/// Bind a UDP socket that other listeners on this host may bind too.
fn bind_shared(addr: SocketAddr) -> Result<UdpSocket, TransportError> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(TransportError::Socket)?;
    socket
        .set_reuse_address(true)
        .map_err(|source| TransportError::Configure {
            option: "SO_REUSEADDR",
            source,
        })?;
    #[cfg(unix)]
    socket
        .set_reuse_port(true)
        .map_err(|source| TransportError::Configure {
            option: "SO_REUSEPORT",
            source,
        })?;
    socket
        .bind(&addr.into())
        .map_err(|source| TransportError::Bind { addr, source })?;
    Ok(socket.into())
}

/// Sending side: an ephemeral socket that targets `group:port`.
pub struct MulticastSender {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl MulticastSender {
    pub fn open(config: &MulticastConfig) -> Result<Self, TransportError> {
        config.require_multicast()?;
        let addr = SocketAddr::V4(SocketAddrV4::new(config.interface, 0));
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        socket
            .set_multicast_ttl_v4(config.ttl)
            .map_err(|source| TransportError::Configure {
                option: "IP_MULTICAST_TTL",
                source,
            })?;
        socket
            .set_multicast_loop_v4(config.loopback)
            .map_err(|source| TransportError::Configure {
                option: "IP_MULTICAST_LOOP",
                source,
            })?;
        let dest = config.destination();
        info!(%dest, ttl = config.ttl, "multicast sender ready");
        Ok(Self { socket, dest })
    }

    pub fn destination(&self) -> SocketAddr {
        self.dest
    }
}

impl DatagramSender for MulticastSender {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        let sent = self
            .socket
            .send_to(datagram, self.dest)
            .map_err(|source| TransportError::Send {
                dest: self.dest,
                source,
            })?;
        if sent != datagram.len() {
            return Err(TransportError::ShortSend {
                dest: self.dest,
                sent,
                len: datagram.len(),
            });
        }
        Ok(())
    }
}
