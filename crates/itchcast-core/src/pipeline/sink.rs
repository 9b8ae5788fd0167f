use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::protocols::itch::ItchMessage;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Consumer of delivered messages.
///
/// `seq` is the 1-based count of delivered messages within the run; `frame`
/// is the raw record body the message was decoded from.
pub trait MessageSink {
    fn deliver(&mut self, seq: u64, frame: &[u8], message: &ItchMessage) -> Result<(), SinkError>;
}

/// Collects delivered messages in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub messages: Vec<(u64, ItchMessage)>,
}

impl MessageSink for VecSink {
    fn deliver(&mut self, seq: u64, _frame: &[u8], message: &ItchMessage) -> Result<(), SinkError> {
        self.messages.push((seq, message.clone()));
        Ok(())
    }
}

/// Writes `[000042] <summary>` lines, optionally preceded by a hex dump.
pub struct TextSink<W> {
    out: W,
    show_raw: bool,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, show_raw: bool) -> Self {
        Self { out, show_raw }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MessageSink for TextSink<W> {
    fn deliver(&mut self, seq: u64, frame: &[u8], message: &ItchMessage) -> Result<(), SinkError> {
        if self.show_raw {
            writeln!(self.out, "Raw: {}", hex(frame))?;
        }
        writeln!(self.out, "[{seq:06}] {message}")?;
        Ok(())
    }
}

/// Writes one JSON object per delivered message.
pub struct JsonLinesSink<W> {
    out: W,
    include_raw: bool,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    seq: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
    #[serde(flatten)]
    message: &'a ItchMessage,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W, include_raw: bool) -> Self {
        Self { out, include_raw }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MessageSink for JsonLinesSink<W> {
    fn deliver(&mut self, seq: u64, frame: &[u8], message: &ItchMessage) -> Result<(), SinkError> {
        let record = JsonRecord {
            seq,
            raw: self.include_raw.then(|| hex(frame)),
            message,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
