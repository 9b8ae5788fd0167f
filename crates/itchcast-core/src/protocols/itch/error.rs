use thiserror::Error;

/// Errors returned by the primitive field readers.
///
/// # Examples
/// ```
/// use itchcast_core::protocols::itch::FieldError;
///
/// let err = FieldError::Truncated { offset: 4, width: 4, actual: 6 };
/// assert!(err.to_string().contains("frame too short"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("frame too short: {width}-byte field at offset {offset}, frame has {actual} bytes")]
    Truncated {
        offset: usize,
        width: usize,
        actual: usize,
    },
    #[error("non-ASCII byte {byte:#04x} at offset {offset}")]
    Encoding { offset: usize, byte: u8 },
}

/// Errors returned by message decoding.
///
/// Unknown type tags are not errors; they decode to
/// [`ItchMessage::Unknown`](super::ItchMessage::Unknown).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty frame: no message type tag")]
    EmptyFrame,
    #[error("truncated '{tag}' message: field at offset {offset} needs {needed} bytes, frame has {actual}")]
    Truncated {
        tag: char,
        offset: usize,
        needed: usize,
        actual: usize,
    },
    #[error("invalid text in '{tag}' message: non-ASCII byte {byte:#04x} at offset {offset}")]
    Encoding { tag: char, offset: usize, byte: u8 },
}

impl DecodeError {
    pub(crate) fn from_field(tag: u8, err: FieldError) -> Self {
        let tag = tag as char;
        match err {
            FieldError::Truncated {
                offset,
                width,
                actual,
            } => DecodeError::Truncated {
                tag,
                offset,
                needed: offset.saturating_add(width),
                actual,
            },
            FieldError::Encoding { offset, byte } => DecodeError::Encoding { tag, offset, byte },
        }
    }

    /// True for errors caused by a frame shorter than its layout.
    pub fn is_truncation(&self) -> bool {
        matches!(self, DecodeError::EmptyFrame | DecodeError::Truncated { .. })
    }
}
