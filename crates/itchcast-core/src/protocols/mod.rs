//! Wire protocol decoders.
//!
//! A protocol module is split by concern:
//! - `layout`: offsets, widths and tag values
//! - `reader`: bounds-checked field reads
//! - `parser`: one routine per message type, built on the reader
//! - `error`: what went wrong and where in the frame
//!
//! Nothing here performs I/O. Sources, transports and the pipeline drivers
//! own files, sockets and counters.

pub mod itch;
