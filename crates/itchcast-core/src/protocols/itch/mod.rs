//! NASDAQ TotalView-ITCH style message decoding.
//!
//! A frame is one record with the 2-byte length prefix already stripped. The
//! first byte is the type tag; each of the twelve known tags has a fixed
//! layout defined in `layout`. Unknown tags decode to
//! [`ItchMessage::Unknown`] instead of failing so newer feeds stay readable.
//!
//! All integers are big-endian, text fields are space-padded ASCII trimmed on
//! read, and prices use the 1/10,000 fixed-point scale throughout.
//!
//! The timestamp slot width is configurable ([`TimestampWidth`]); offsets
//! after it shift with the chosen width.

pub mod error;
pub mod layout;
pub mod message;
pub mod parser;
pub mod reader;
mod summary;

pub use error::{DecodeError, FieldError};
pub use layout::TimestampWidth;
pub use message::{
    AddOrder, AddOrderMpid, Clock, CrossTrade, ItchMessage, OrderCancel, OrderDelete,
    OrderExecuted, OrderExecutedWithPrice, OrderReplace, Price, StockDirectory, SystemEvent,
    Timestamp, Trade, TradingAction,
};
pub use parser::{Decoder, DecoderConfig, decode};
pub use summary::summary;
