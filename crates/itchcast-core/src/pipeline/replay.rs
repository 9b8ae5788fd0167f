use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, trace};

use super::stop::StopFlag;
use super::{RunClock, per_second};
use crate::source::{FrameSource, SourceError};
use crate::transport::{DatagramSender, TransportError};

pub const DEFAULT_PACING: Duration = Duration::from_micros(100);

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Sleep between sends; zero sends back-to-back.
    pub pacing: Duration,
    pub max_records: Option<u64>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
            max_records: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub started_at: String,
    pub elapsed_ms: u64,
    pub records: u64,
    pub bytes: u64,
}

/// Send every record of `source` as one datagram, unchanged.
///
/// # Errors
/// The first source or transport failure ends the replay.
pub fn replay<F, T>(
    source: &mut F,
    sender: &mut T,
    options: &ReplayOptions,
    stop: &StopFlag,
) -> Result<ReplaySummary, ReplayError>
where
    F: FrameSource + ?Sized,
    T: DatagramSender + ?Sized,
{
    let clock = RunClock::start();
    let mut records = 0u64;
    let mut bytes = 0u64;
    info!(pacing_us = options.pacing.as_micros() as u64, "replay started");

    while !stop.is_stopped() && options.max_records.is_none_or(|max| records < max) {
        let Some(record) = source.next_record()? else {
            break;
        };
        sender.send(&record)?;
        records += 1;
        bytes += record.len() as u64;
        trace!(records, len = record.len(), "record sent");
        if !options.pacing.is_zero() {
            std::thread::sleep(options.pacing);
        }
    }

    let elapsed = clock.elapsed();
    info!(
        records,
        bytes,
        rate = per_second(records, elapsed),
        "replay finished"
    );
    Ok(ReplaySummary {
        started_at: clock.started_at,
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        records,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::framing::encode_frame;
    use crate::source::CaptureSource;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<Vec<u8>>,
    }

    impl DatagramSender for Recorder {
        fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
            self.sent.push(datagram.to_vec());
            Ok(())
        }
    }

    fn capture(count: u8) -> Vec<u8> {
        (0..count)
            .flat_map(|i| encode_frame(&[b'Z', i]).unwrap())
            .collect()
    }

    #[test]
    fn forwards_records_verbatim() {
        let mut source = CaptureSource::new(Cursor::new(capture(3)));
        let mut sender = Recorder::default();
        let options = ReplayOptions {
            pacing: Duration::ZERO,
            max_records: None,
        };
        let summary = replay(&mut source, &mut sender, &options, &StopFlag::new()).unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.bytes, 12);
        assert_eq!(sender.sent[1], vec![0x00, 0x02, b'Z', 1]);
    }

    #[test]
    fn honours_max_records_and_stop() {
        let options = ReplayOptions {
            pacing: Duration::ZERO,
            max_records: Some(2),
        };
        let mut source = CaptureSource::new(Cursor::new(capture(5)));
        let mut sender = Recorder::default();
        let summary = replay(&mut source, &mut sender, &options, &StopFlag::new()).unwrap();
        assert_eq!(summary.records, 2);

        let stop = StopFlag::new();
        stop.stop();
        let mut source = CaptureSource::new(Cursor::new(capture(5)));
        let summary = replay(&mut source, &mut sender, &options, &stop).unwrap();
        assert_eq!(summary.records, 0);
    }

    #[test]
    fn truncated_capture_is_an_error() {
        let mut bytes = capture(1);
        bytes.extend_from_slice(&[0x00, 0x04, b'Z']);
        let mut source = CaptureSource::new(Cursor::new(bytes));
        let mut sender = Recorder::default();
        let err = replay(
            &mut source,
            &mut sender,
            &ReplayOptions::default(),
            &StopFlag::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::Source(SourceError::Incomplete { .. })));
        assert_eq!(sender.sent.len(), 1);
    }
}
