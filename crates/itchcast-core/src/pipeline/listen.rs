use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::filter::MessageFilter;
use super::sink::{MessageSink, SinkError};
use super::stop::StopFlag;
use super::{RunClock, per_second};
use crate::framing::extract_frame;
use crate::protocols::itch::{Decoder, DecoderConfig};
use crate::source::{FrameSource, SourceError};
use crate::transport::{DatagramReceiver, TransportError};

pub const DEFAULT_STATS_INTERVAL: u64 = 1000;

#[derive(Debug, Error)]
pub enum ListenError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

#[derive(Debug, Clone)]
pub struct ListenOptions {
    pub decoder: DecoderConfig,
    pub filter: MessageFilter,
    /// Stop after this many delivered messages.
    pub max_messages: Option<u64>,
    /// Log progress every N delivered messages; 0 disables.
    pub stats_interval: u64,
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self {
            decoder: DecoderConfig::default(),
            filter: MessageFilter::default(),
            max_messages: None,
            stats_interval: DEFAULT_STATS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Datagrams or records handed to the processor.
    pub received: u64,
    pub decoded: u64,
    /// Messages passed to the sink; also the last sequence number used.
    pub delivered: u64,
    pub filtered_out: u64,
    /// Decoded messages with an unrecognized tag.
    pub unknown: u64,
    pub frame_errors: u64,
    pub decode_errors: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListenSummary {
    pub started_at: String,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub stats: FeedStats,
}

impl ListenSummary {
    /// Delivered messages per second over the run.
    pub fn rate(&self) -> f64 {
        per_second(
            self.stats.delivered,
            std::time::Duration::from_millis(self.elapsed_ms),
        )
    }
}

/// One step of the live pipeline: extract, decode, filter, deliver.
///
/// Malformed datagrams and frames are counted and skipped; only sink
/// failures are returned.
pub struct FeedProcessor {
    decoder: Decoder,
    filter: MessageFilter,
    stats: FeedStats,
}

impl FeedProcessor {
    pub fn new(decoder: Decoder, filter: MessageFilter) -> Self {
        Self {
            decoder,
            filter,
            stats: FeedStats::default(),
        }
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    pub fn into_stats(self) -> FeedStats {
        self.stats
    }

    pub fn process<S: MessageSink + ?Sized>(
        &mut self,
        datagram: &[u8],
        sink: &mut S,
    ) -> Result<(), SinkError> {
        self.stats.received += 1;
        let frame = match extract_frame(datagram) {
            Ok((frame, _)) => frame,
            Err(err) => {
                self.stats.frame_errors += 1;
                warn!(error = %err, len = datagram.len(), "dropping malformed datagram");
                return Ok(());
            }
        };

        let message = match self.decoder.decode(frame) {
            Ok(message) => message,
            Err(err) => {
                self.stats.decode_errors += 1;
                warn!(error = %err, len = frame.len(), "dropping undecodable frame");
                return Ok(());
            }
        };
        self.stats.decoded += 1;
        if message.is_unknown() {
            self.stats.unknown += 1;
            debug!(
                tag = %char::from(message.tag()).escape_default(),
                len = frame.len(),
                "unknown message type"
            );
        }

        if !self.filter.matches(&message) {
            self.stats.filtered_out += 1;
            return Ok(());
        }
        self.stats.delivered += 1;
        sink.deliver(self.stats.delivered, frame, &message)
    }
}

struct Progress {
    interval: u64,
    next: u64,
}

impl Progress {
    fn new(interval: u64) -> Self {
        Self {
            interval,
            next: interval,
        }
    }

    fn report(&mut self, stats: &FeedStats, clock: &RunClock) {
        if self.interval == 0 || stats.delivered < self.next {
            return;
        }
        self.next = stats.delivered + self.interval;
        info!(
            messages = stats.delivered,
            rate = per_second(stats.delivered, clock.elapsed()),
            "progress"
        );
    }
}

fn limit_reached(stats: &FeedStats, max_messages: Option<u64>) -> bool {
    max_messages.is_some_and(|max| stats.delivered >= max)
}

fn finish(clock: RunClock, stats: FeedStats) -> ListenSummary {
    let summary = ListenSummary {
        started_at: clock.started_at.clone(),
        elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
        stats,
    };
    info!(
        messages = stats.delivered,
        received = stats.received,
        errors = stats.frame_errors + stats.decode_errors,
        elapsed_ms = summary.elapsed_ms,
        rate = summary.rate(),
        "stopped"
    );
    summary
}

/// Live loop: receive datagrams until stopped or `max_messages` delivered.
///
/// # Errors
/// Transport receive failures and sink failures end the loop.
pub fn listen<R, S>(
    receiver: &mut R,
    sink: &mut S,
    options: &ListenOptions,
    stop: &StopFlag,
) -> Result<ListenSummary, ListenError>
where
    R: DatagramReceiver + ?Sized,
    S: MessageSink + ?Sized,
{
    let clock = RunClock::start();
    let mut processor = FeedProcessor::new(Decoder::new(options.decoder), options.filter.clone());
    let mut progress = Progress::new(options.stats_interval);
    info!("listening for ITCH messages");

    while !stop.is_stopped() && !limit_reached(processor.stats(), options.max_messages) {
        let Some(datagram) = receiver.receive()? else {
            continue;
        };
        processor.process(datagram, sink)?;
        progress.report(processor.stats(), &clock);
    }
    Ok(finish(clock, processor.into_stats()))
}

/// Offline loop: run every record of a source through the live pipeline.
///
/// # Errors
/// Source read failures and sink failures end the loop.
pub fn decode_source<F, S>(
    source: &mut F,
    sink: &mut S,
    options: &ListenOptions,
    stop: &StopFlag,
) -> Result<ListenSummary, ListenError>
where
    F: FrameSource + ?Sized,
    S: MessageSink + ?Sized,
{
    let clock = RunClock::start();
    let mut processor = FeedProcessor::new(Decoder::new(options.decoder), options.filter.clone());
    let mut progress = Progress::new(options.stats_interval);

    while !stop.is_stopped() && !limit_reached(processor.stats(), options.max_messages) {
        let Some(record) = source.next_record()? else {
            break;
        };
        processor.process(&record, sink)?;
        progress.report(processor.stats(), &clock);
    }
    Ok(finish(clock, processor.into_stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::encode_frame;
    use crate::pipeline::sink::VecSink;

    fn delete_record(order_ref: u64) -> Vec<u8> {
        let mut frame = vec![b'D', 0, 0, 0, 0];
        frame.extend_from_slice(&5u64.to_be_bytes());
        frame.extend_from_slice(&order_ref.to_be_bytes());
        encode_frame(&frame).unwrap()
    }

    #[test]
    fn processor_counts_each_outcome() {
        let mut processor = FeedProcessor::new(Decoder::default(), MessageFilter::new());
        let mut sink = VecSink::default();

        processor.process(&delete_record(1), &mut sink).unwrap();
        processor.process(&[0x00], &mut sink).unwrap();
        processor.process(&encode_frame(b"D").unwrap(), &mut sink).unwrap();
        processor.process(&encode_frame(b"Z").unwrap(), &mut sink).unwrap();

        let stats = *processor.stats();
        assert_eq!(stats.received, 4);
        assert_eq!(stats.frame_errors, 1);
        assert_eq!(stats.decode_errors, 1);
        assert_eq!(stats.decoded, 2);
        assert_eq!(stats.unknown, 1);
        assert_eq!(stats.delivered, 2);
        assert_eq!(sink.messages.len(), 2);
        assert_eq!(sink.messages[0].0, 1);
        assert_eq!(sink.messages[1].0, 2);
    }

    #[test]
    fn processor_applies_filter_before_sequence() {
        let filter = MessageFilter::new().with_tags([b'Z']);
        let mut processor = FeedProcessor::new(Decoder::default(), filter);
        let mut sink = VecSink::default();

        processor.process(&delete_record(1), &mut sink).unwrap();
        processor.process(&encode_frame(b"Z").unwrap(), &mut sink).unwrap();

        assert_eq!(processor.stats().filtered_out, 1);
        assert_eq!(sink.messages.len(), 1);
        assert_eq!(sink.messages[0].0, 1);
    }

    #[test]
    fn summary_rate_uses_elapsed() {
        let summary = ListenSummary {
            started_at: "1970-01-01T00:00:00Z".to_string(),
            elapsed_ms: 2000,
            stats: FeedStats {
                delivered: 500,
                ..FeedStats::default()
            },
        };
        assert!((summary.rate() - 250.0).abs() < f64::EPSILON);
        let idle = ListenSummary {
            elapsed_ms: 0,
            ..summary
        };
        assert_eq!(idle.rate(), 0.0);
    }
}
