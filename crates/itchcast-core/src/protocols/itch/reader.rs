//! Primitive field readers over a frame.
//!
//! The free functions are the field codec: pure, bounds-checked reads at
//! absolute offsets. [`ItchReader`] layers the message conventions on top
//! (body-relative offsets, timestamp width, tag-aware errors) so parsers
//! never index bytes directly.

use super::error::{DecodeError, FieldError};
use super::layout::{self, TimestampWidth};
use super::message::{Price, Timestamp};

fn read_array<const N: usize>(frame: &[u8], offset: usize) -> Result<[u8; N], FieldError> {
    let bytes = offset
        .checked_add(N)
        .and_then(|end| frame.get(offset..end))
        .ok_or(FieldError::Truncated {
            offset,
            width: N,
            actual: frame.len(),
        })?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

pub fn read_u8(frame: &[u8], offset: usize) -> Result<u8, FieldError> {
    read_array::<1>(frame, offset).map(|[b]| b)
}

pub fn read_u16_be(frame: &[u8], offset: usize) -> Result<u16, FieldError> {
    read_array(frame, offset).map(u16::from_be_bytes)
}

pub fn read_u32_be(frame: &[u8], offset: usize) -> Result<u32, FieldError> {
    read_array(frame, offset).map(u32::from_be_bytes)
}

/// Read a 6-byte big-endian integer.
pub fn read_u48_be(frame: &[u8], offset: usize) -> Result<u64, FieldError> {
    let bytes: [u8; 6] = read_array(frame, offset)?;
    Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

pub fn read_u64_be(frame: &[u8], offset: usize) -> Result<u64, FieldError> {
    read_array(frame, offset).map(u64::from_be_bytes)
}

/// Decode `frame[start..end]` as ASCII and strip trailing space padding.
///
/// # Examples
/// ```
/// use itchcast_core::protocols::itch::reader::read_fixed_ascii;
///
/// let frame = b"xAAPL    y";
/// assert_eq!(read_fixed_ascii(frame, 1, 9).unwrap(), "AAPL");
/// ```
///
/// # Errors
/// `Truncated` when the range leaves the frame, `Encoding` on a non-ASCII
/// byte.
pub fn read_fixed_ascii(frame: &[u8], start: usize, end: usize) -> Result<String, FieldError> {
    let bytes = frame.get(start..end).ok_or(FieldError::Truncated {
        offset: start,
        width: end.saturating_sub(start),
        actual: frame.len(),
    })?;
    if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(FieldError::Encoding {
            offset: start + pos,
            byte: bytes[pos],
        });
    }
    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    Ok(text.trim_end_matches(' ').to_string())
}

/// Read a single-character ASCII code.
pub fn read_ascii_char(frame: &[u8], offset: usize) -> Result<char, FieldError> {
    let byte = read_u8(frame, offset)?;
    if !byte.is_ascii() {
        return Err(FieldError::Encoding { offset, byte });
    }
    Ok(char::from(byte))
}

/// Read a 1/10,000 fixed-point price.
pub fn read_price(frame: &[u8], offset: usize) -> Result<Price, FieldError> {
    read_u32_be(frame, offset).map(Price::from_raw)
}

pub fn read_timestamp(
    frame: &[u8],
    offset: usize,
    width: TimestampWidth,
) -> Result<Timestamp, FieldError> {
    let nanos = match width {
        TimestampWidth::Six => read_u48_be(frame, offset)?,
        TimestampWidth::Eight => read_u64_be(frame, offset)?,
    };
    Ok(Timestamp::from_nanos(nanos))
}

/// Message-level reader: body-relative offsets and tag-aware errors.
pub struct ItchReader<'a> {
    frame: &'a [u8],
    tag: u8,
    width: TimestampWidth,
}

impl<'a> ItchReader<'a> {
    pub fn new(frame: &'a [u8], tag: u8, width: TimestampWidth) -> Self {
        Self { frame, tag, width }
    }

    /// Fail unless the frame covers every field of its tag's layout.
    ///
    /// The error names the first field that runs past the end of the frame,
    /// so a short frame is always reported as truncated whatever its
    /// remaining bytes hold. Tags without a layout always pass.
    pub fn require_len(&self) -> Result<(), DecodeError> {
        let (Some(starts), Some(min)) = (
            layout::field_starts(self.tag),
            layout::min_frame_len(self.tag, self.width),
        ) else {
            return Ok(());
        };
        let actual = self.frame.len();
        if actual >= min {
            return Ok(());
        }

        let body = self.width.body_offset();
        let bounds: Vec<usize> = std::iter::once(layout::TIMESTAMP_OFFSET)
            .chain(starts.iter().map(|start| body + start))
            .chain(std::iter::once(min))
            .collect();
        let (offset, needed) = bounds
            .windows(2)
            .map(|field| (field[0], field[1]))
            .find(|&(_, end)| end > actual)
            .unwrap_or((layout::TIMESTAMP_OFFSET, min));
        Err(DecodeError::Truncated {
            tag: char::from(self.tag),
            offset,
            needed,
            actual,
        })
    }

    fn at(&self, body_offset: usize) -> usize {
        self.width.body_offset() + body_offset
    }

    fn map<T>(&self, result: Result<T, FieldError>) -> Result<T, DecodeError> {
        result.map_err(|err| DecodeError::from_field(self.tag, err))
    }

    pub fn timestamp(&self) -> Result<Timestamp, DecodeError> {
        self.map(read_timestamp(self.frame, layout::TIMESTAMP_OFFSET, self.width))
    }

    pub fn u32(&self, body_offset: usize) -> Result<u32, DecodeError> {
        self.map(read_u32_be(self.frame, self.at(body_offset)))
    }

    pub fn u64(&self, body_offset: usize) -> Result<u64, DecodeError> {
        self.map(read_u64_be(self.frame, self.at(body_offset)))
    }

    pub fn code(&self, body_offset: usize) -> Result<char, DecodeError> {
        self.map(read_ascii_char(self.frame, self.at(body_offset)))
    }

    pub fn price(&self, body_offset: usize) -> Result<Price, DecodeError> {
        self.map(read_price(self.frame, self.at(body_offset)))
    }

    pub fn text(&self, body_offset: usize, len: usize) -> Result<String, DecodeError> {
        let start = self.at(body_offset);
        self.map(read_fixed_ascii(self.frame, start, start + len))
    }

    pub fn stock(&self, body_offset: usize) -> Result<String, DecodeError> {
        self.text(body_offset, layout::STOCK_LEN)
    }
}
