use super::error::FrameError;
use super::layout;

/// Strip the 2-byte big-endian length prefix from `datagram`.
///
/// Returns the frame body and the number of bytes consumed (`2 + L`). Bytes
/// past the declared length belong to the caller.
///
/// # Examples
/// ```
/// use itchcast_core::extract_frame;
///
/// let (frame, consumed) = extract_frame(&[0x00, 0x03, b'Z', 1, 2, 0xFF]).unwrap();
/// assert_eq!(frame, &[b'Z', 1, 2]);
/// assert_eq!(consumed, 5);
/// ```
///
/// # Errors
/// `MissingLength` with fewer than two bytes, `TruncatedPayload` when fewer
/// than `L` bytes follow the prefix.
pub fn extract_frame(datagram: &[u8]) -> Result<(&[u8], usize), FrameError> {
    let prefix = datagram
        .get(layout::LENGTH_RANGE)
        .ok_or(FrameError::MissingLength {
            actual: datagram.len(),
        })?;
    let declared = usize::from(u16::from_be_bytes([prefix[0], prefix[1]]));
    let consumed = layout::LENGTH_PREFIX_LEN + declared;
    let frame = datagram
        .get(layout::LENGTH_PREFIX_LEN..consumed)
        .ok_or(FrameError::TruncatedPayload {
            declared,
            available: datagram.len() - layout::LENGTH_PREFIX_LEN,
        })?;
    Ok((frame, consumed))
}

/// Prepend the 2-byte big-endian length prefix.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u16::try_from(payload.len())
        .map_err(|_| FrameError::PayloadTooLarge { len: payload.len() })?;
    let mut out = Vec::with_capacity(layout::LENGTH_PREFIX_LEN + payload.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Iterator over back-to-back length-prefixed frames in one buffer.
///
/// Yields each frame body in order and stops after the first error.
pub struct Frames<'a> {
    buffer: &'a [u8],
    failed: bool,
}

impl<'a> Frames<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            failed: false,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.buffer
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<&'a [u8], FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.buffer.is_empty() {
            return None;
        }
        match extract_frame(self.buffer) {
            Ok((frame, consumed)) => {
                self.buffer = &self.buffer[consumed..];
                Some(Ok(frame))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
