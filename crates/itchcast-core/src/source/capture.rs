use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::{FrameSource, SourceError};
use crate::framing::layout::LENGTH_PREFIX_LEN;

/// Reader over a raw capture of back-to-back length-prefixed records.
///
/// End of input on a record boundary ends the stream; end of input inside a
/// prefix or payload is reported as [`SourceError::Incomplete`].
pub struct CaptureSource<R> {
    reader: R,
    offset: u64,
}

impl CaptureSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> CaptureSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> FrameSource for CaptureSource<R> {
    fn next_record(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let start = self.offset;
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        let got = self.fill(&mut prefix)?;
        if got == 0 {
            return Ok(None);
        }
        if got < LENGTH_PREFIX_LEN {
            return Err(SourceError::Incomplete {
                offset: start,
                needed: LENGTH_PREFIX_LEN,
                available: got,
            });
        }

        let declared = usize::from(u16::from_be_bytes(prefix));
        let mut record = vec![0u8; LENGTH_PREFIX_LEN + declared];
        record[..LENGTH_PREFIX_LEN].copy_from_slice(&prefix);
        let got = self.fill(&mut record[LENGTH_PREFIX_LEN..])?;
        if got < declared {
            return Err(SourceError::Incomplete {
                offset: start + LENGTH_PREFIX_LEN as u64,
                needed: declared,
                available: got,
            });
        }
        self.offset += record.len() as u64;
        Ok(Some(record))
    }
}
