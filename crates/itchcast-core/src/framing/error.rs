use thiserror::Error;

/// Errors returned by frame extraction and encoding.
///
/// `MissingLength` and `TruncatedPayload` are both "frame too short"
/// conditions: either the prefix or the declared payload is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame too short: need 2 length bytes, got {actual}")]
    MissingLength { actual: usize },
    #[error("frame too short: length prefix declares {declared} bytes, only {available} follow")]
    TruncatedPayload { declared: usize, available: usize },
    #[error("payload too large for a 2-byte length prefix: {len} bytes")]
    PayloadTooLarge { len: usize },
}

impl FrameError {
    pub fn is_too_short(&self) -> bool {
        matches!(
            self,
            FrameError::MissingLength { .. } | FrameError::TruncatedPayload { .. }
        )
    }
}
