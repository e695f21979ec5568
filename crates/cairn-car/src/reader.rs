use std::io::{ErrorKind, Read};

use bytes::Bytes;
use cairn_codec::{varint, CodecError};
use cairn_store::Block;
use tracing::debug;

use crate::entry::CarEntry;
use crate::error::{CarError, CarResult};

/// One length-prefixed record: its body and where its length prefix starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarRecord {
    pub data: Bytes,
    pub start_offset: usize,
}

/// Reads records from a fully buffered CAR stream.
///
/// The buffer is shared, so [`records`](Self::records) can be called any
/// number of times and each call starts over from the beginning.
#[derive(Clone, Debug)]
pub struct CarReader {
    data: Bytes,
}

impl CarReader {
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// One-pass reader over any byte source.
    pub fn from_reader<R: Read>(reader: R) -> CarStream<R> {
        CarStream::new(reader)
    }

    /// Total stream length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate records from the start of the stream.
    pub fn records(&self) -> Records {
        Records {
            data: self.data.clone(),
            pos: 0,
            failed: false,
        }
    }

    /// Iterate records decoded and validated as [`CarEntry`]s.
    pub fn entries(&self) -> impl Iterator<Item = CarResult<CarEntry>> {
        self.records()
            .map(|record| record.and_then(|r| CarEntry::decode(&r)))
    }

    /// Iterate validated blocks in stream order.
    pub fn blocks(&self) -> impl Iterator<Item = CarResult<Block>> {
        self.entries().map(|entry| entry.map(CarEntry::into_block))
    }
}

/// Iterator over the records of a [`CarReader`]. Stops after the first error.
#[derive(Debug)]
pub struct Records {
    data: Bytes,
    pos: usize,
    failed: bool,
}

impl Records {
    fn read_record(&mut self) -> CarResult<CarRecord> {
        let start_offset = self.pos;
        let (declared, body_start) = varint::decode(&self.data, start_offset)?;
        let remaining = self.data.len() - body_start;
        let len = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= remaining)
            .ok_or(CarError::TruncatedContainer {
                offset: start_offset,
                declared,
                remaining,
            })?;

        let end = body_start + len;
        self.pos = end;
        debug!(offset = start_offset, len, "read CAR record");
        Ok(CarRecord {
            data: self.data.slice(body_start..end),
            start_offset,
        })
    }
}

impl Iterator for Records {
    type Item = CarResult<CarRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let result = self.read_record();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// One-pass record iterator over an [`std::io::Read`] source.
///
/// Offsets are counted from the first byte this reader consumed.
pub struct CarStream<R> {
    reader: R,
    pos: usize,
    done: bool,
}

impl<R: Read> CarStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pos: 0,
            done: false,
        }
    }

    /// Read one length prefix and report how many bytes it took.
    /// `Ok(None)` means clean end of stream.
    fn read_length(&mut self) -> CarResult<Option<(u64, usize)>> {
        let mut buf = [0u8; varint::MAX_LEN];
        let mut n = 0;
        loop {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte) {
                Ok(0) if n == 0 => return Ok(None),
                Ok(0) => {
                    return Err(CodecError::MalformedVarint { offset: self.pos }.into());
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
            if n == buf.len() {
                return Err(CodecError::VarintOverflow { offset: self.pos }.into());
            }
            buf[n] = byte[0];
            n += 1;
            if byte[0] & 0x80 == 0 {
                break;
            }
        }
        let (value, _) = varint::decode(&buf[..n], 0).map_err(|e| match e {
            CodecError::VarintOverflow { .. } => CodecError::VarintOverflow { offset: self.pos },
            other => other,
        })?;
        Ok(Some((value, n)))
    }

    fn read_record(&mut self) -> CarResult<Option<CarRecord>> {
        let start_offset = self.pos;
        let Some((declared, prefix_len)) = self.read_length()? else {
            return Ok(None);
        };
        let body_start = start_offset + prefix_len;

        let mut body = Vec::new();
        let read = (&mut self.reader).take(declared).read_to_end(&mut body)?;
        if (read as u64) < declared {
            return Err(CarError::TruncatedContainer {
                offset: start_offset,
                declared,
                remaining: read,
            });
        }

        self.pos = body_start + read;
        debug!(offset = start_offset, len = read, "streamed CAR record");
        Ok(Some(CarRecord {
            data: Bytes::from(body),
            start_offset,
        }))
    }
}

impl<R: Read> Iterator for CarStream<R> {
    type Item = CarResult<CarRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
