//! Datagram transports.
//!
//! The pipeline drivers only see the [`DatagramReceiver`] and
//! [`DatagramSender`] traits; [`multicast`] provides the UDP multicast
//! implementations used by the CLI.

pub mod error;
pub mod multicast;

pub use error::TransportError;
pub use multicast::{MulticastConfig, MulticastReceiver, MulticastSender};

pub trait DatagramReceiver {
    /// Block for the next datagram.
    ///
    /// `Ok(None)` means the read timeout elapsed without data, giving the
    /// caller a chance to observe cancellation.
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError>;
}

pub trait DatagramSender {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError>;
}

