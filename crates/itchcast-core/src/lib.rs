//! ITCH market-data feed decoding and multicast replay.
//!
//! The core is the message layer: a frame (one record with its 2-byte length
//! prefix stripped) decodes into exactly one [`ItchMessage`] variant, chosen
//! by the one-byte type tag and read from fixed big-endian offsets. Decoding
//! is pure, synchronous and stateless, so frames can be decoded concurrently
//! without coordination.
//!
//! Around it sit the collaborators used by the two pipelines:
//! - replay: [`source`] -> [`transport`] sender, records forwarded verbatim
//! - listen: [`transport`] receiver -> [`extract_frame`] -> [`decode`] ->
//!   [`MessageFilter`] -> [`MessageSink`]
//!
//! Malformed input never panics: frame and decode failures come back as
//! [`FrameError`] / [`DecodeError`] values and the driver loops count and
//! skip them. Unknown tags are a normal outcome ([`ItchMessage::Unknown`]).
//!
//! # Examples
//! ```
//! use itchcast_core::{ItchMessage, decode, extract_frame};
//!
//! let mut frame = vec![b'A', 0, 0, 0, 0];
//! frame.extend_from_slice(&1_000_000_000u64.to_be_bytes());
//! frame.extend_from_slice(&42u64.to_be_bytes());
//! frame.push(b'B');
//! frame.extend_from_slice(&100u32.to_be_bytes());
//! frame.extend_from_slice(b"AAPL    ");
//! frame.extend_from_slice(&1_500_000u32.to_be_bytes());
//!
//! let mut datagram = (frame.len() as u16).to_be_bytes().to_vec();
//! datagram.extend_from_slice(&frame);
//!
//! let (body, _) = extract_frame(&datagram)?;
//! let ItchMessage::AddOrder(order) = decode(body)? else { unreachable!() };
//! assert_eq!(order.timestamp.to_string(), "00:00:01.000");
//! assert_eq!(order.stock, "AAPL");
//! assert_eq!(order.price.to_string(), "150.0000");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod framing;
pub mod pipeline;
pub mod protocols;
pub mod source;
pub mod transport;

pub use framing::{FrameError, Frames, encode_frame, extract_frame};
pub use pipeline::{
    FeedProcessor, FeedStats, JsonLinesSink, ListenError, ListenOptions, ListenSummary,
    MessageFilter, MessageSink, ReplayError, ReplayOptions, ReplaySummary, SinkError, StopFlag,
    TextSink, VecSink, decode_source, listen, replay,
};
pub use protocols::itch::{
    DecodeError, Decoder, DecoderConfig, FieldError, ItchMessage, Price, Timestamp,
    TimestampWidth, decode, summary,
};
pub use source::{CaptureSource, FrameSource, PcapDatagramSource, SourceError, open_capture};
pub use transport::{
    DatagramReceiver, DatagramSender, MulticastConfig, MulticastReceiver, MulticastSender,
    TransportError,
};
