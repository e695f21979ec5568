//! Schema-less tag/length/value records.
//!
//! Each field starts with a varint tag: `field_number << 3 | wire_type`.
//! Only the three wire types used by DAG-PB, link and UnixFS records are
//! understood:
//!
//! | wire type | payload                                  |
//! |-----------|------------------------------------------|
//! | 0         | varint                                   |
//! | 1         | 8 bytes, little-endian                   |
//! | 2         | varint length followed by that many bytes |
//!
//! [`FieldReader`] yields typed [`Field`]s; record shapes such as
//! [`PbLink`](crate::PbLink) decode themselves by matching on field numbers.

use crate::error::{CodecError, CodecResult};
use crate::varint;

/// Wire type carried in the low three bits of a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
}

impl WireType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            _ => None,
        }
    }
}

/// A decoded field payload. Length-delimited payloads borrow from the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Bytes(&'a [u8]),
}

impl FieldValue<'_> {
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Varint(_) => WireType::Varint,
            Self::Fixed64(_) => WireType::Fixed64,
            Self::Bytes(_) => WireType::LengthDelimited,
        }
    }
}

/// One field of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field<'a> {
    pub number: u64,
    pub value: FieldValue<'a>,
}

/// Iterates the fields of a record in encounter order.
///
/// Stops after the first error.
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            failed: false,
        }
    }

    /// Byte offset of the next unread field.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_field(&mut self) -> CodecResult<Field<'a>> {
        let (tag, pos) = varint::decode(self.buf, self.pos)?;
        let number = tag >> 3;
        let code = (tag & 0x7) as u8;
        let wire_type = WireType::from_code(code).ok_or(CodecError::UnsupportedWireType {
            field: number,
            wire_type: code,
        })?;

        let (value, next) = match wire_type {
            WireType::Varint => {
                let (v, next) = varint::decode(self.buf, pos)?;
                (FieldValue::Varint(v), next)
            }
            WireType::Fixed64 => {
                let bytes = self.take_bytes(pos, 8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                (FieldValue::Fixed64(u64::from_le_bytes(raw)), pos + 8)
            }
            WireType::LengthDelimited => {
                let (len, start) = varint::decode(self.buf, pos)?;
                let bytes = self.take_bytes(start, len)?;
                (FieldValue::Bytes(bytes), start + bytes.len())
            }
        };

        self.pos = next;
        Ok(Field { number, value })
    }

    fn take_bytes(&self, start: usize, expected: u64) -> CodecResult<&'a [u8]> {
        let available = self.buf.len().saturating_sub(start);
        let truncated = || CodecError::Truncated {
            offset: start,
            expected,
            actual: available,
        };
        let len = usize::try_from(expected).map_err(|_| truncated())?;
        if len > available {
            return Err(truncated());
        }
        Ok(&self.buf[start..start + len])
    }
}

impl<'a> Iterator for FieldReader<'a> {
    type Item = CodecResult<Field<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.buf.len() {
            return None;
        }
        let result = self.read_field();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Iterate the fields of `buf`.
pub fn decode_fields(buf: &[u8]) -> FieldReader<'_> {
    FieldReader::new(buf)
}

/// Append a tag for `number` and `wire_type`.
pub fn encode_tag(out: &mut Vec<u8>, number: u64, wire_type: WireType) {
    varint::encode_into(out, (number << 3) | wire_type.code() as u64);
}

/// Append one complete field: tag, length prefix if length-delimited, payload.
pub fn encode_field(out: &mut Vec<u8>, number: u64, value: FieldValue<'_>) {
    encode_tag(out, number, value.wire_type());
    match value {
        FieldValue::Varint(v) => varint::encode_into(out, v),
        FieldValue::Fixed64(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Bytes(bytes) => {
            varint::encode_into(out, bytes.len() as u64);
            out.extend_from_slice(bytes);
        }
    }
}
