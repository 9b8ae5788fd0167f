//! Outer length-prefix framing shared by captures and multicast datagrams.
//!
//! Wire form: `[u16 big-endian length][length bytes payload]`, repeated
//! back-to-back in capture files and sent one per datagram live. The length
//! describes exactly the decoder's input; nothing past it belongs to the
//! frame.

pub mod error;
pub mod layout;
pub mod parser;

pub use error::FrameError;
pub use parser::{Frames, encode_frame, extract_frame};
