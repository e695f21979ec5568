//! Unsigned varints: 7 payload bits per byte, low-order group first, with
//! the continuation bit (0x80) set on every byte except the last.

use crate::error::{CodecError, CodecResult};

/// Maximum encoded length of a `u64`.
pub const MAX_LEN: usize = 10;

/// Encode `value` into a fresh buffer.
pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(value));
    encode_into(&mut buf, value);
    buf
}

/// Append the encoding of `value` to `buf`.
pub fn encode_into(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Number of bytes `encode(value)` produces.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decode a varint starting at `offset`. Returns `(value, new_offset)`.
pub fn decode(buf: &[u8], offset: usize) -> CodecResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    let mut pos = offset;
    loop {
        let byte = *buf
            .get(pos)
            .ok_or(CodecError::MalformedVarint { offset })?;
        pos += 1;

        let bits = (byte & 0x7F) as u64;
        if shift > 63 || (shift == 63 && bits > 1) {
            return Err(CodecError::VarintOverflow { offset });
        }
        value |= bits << shift;

        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
        shift += 7;
    }
}
