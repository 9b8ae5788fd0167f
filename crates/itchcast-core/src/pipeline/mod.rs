//! Driver loops around the decoder.
//!
//! - `replay`: frame source -> datagram sender, records forwarded verbatim
//! - `listen`: datagram receiver -> frame extractor -> decoder -> filter -> sink
//!
//! Counters live in the loop that owns them and are returned in the run
//! summary. Cancellation is cooperative through [`StopFlag`] and is only
//! observed between frames.

mod filter;
mod listen;
mod replay;
mod sink;
mod stop;

pub use filter::MessageFilter;
pub use listen::{
    FeedProcessor, FeedStats, ListenError, ListenOptions, ListenSummary, decode_source, listen,
};
pub use replay::{ReplayError, ReplayOptions, ReplaySummary, replay};
pub use sink::{JsonLinesSink, MessageSink, SinkError, TextSink, VecSink};
pub use stop::StopFlag;

use std::time::{Duration, Instant};

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Wall-clock start plus a monotonic timer for run summaries.
struct RunClock {
    started_at: String,
    start: Instant,
}

impl RunClock {
    fn start() -> Self {
        let started_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string());
        Self {
            started_at,
            start: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { count as f64 / secs } else { 0.0 }
}
