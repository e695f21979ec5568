use std::io::Write;

use cairn_codec::varint;
use cairn_store::Block;

use crate::error::CarResult;

/// Builds a CAR stream from blocks, in the order they are added.
#[derive(Debug, Default)]
pub struct CarWriter {
    buf: Vec<u8>,
    count: usize,
}

impl CarWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record: `varint(len(cid ++ data)) ++ cid ++ data`.
    pub fn add_block(&mut self, block: &Block) {
        let body_len = block.cid.encoded_len() + block.size();
        varint::encode_into(&mut self.buf, body_len as u64);
        block.cid.write_to(&mut self.buf);
        self.buf.extend_from_slice(&block.data);
        self.count += 1;
    }

    /// Number of blocks written so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Stream length so far in bytes.
    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Write the stream to `out` and flush it.
    pub fn finish_to<W: Write>(self, mut out: W) -> CarResult<()> {
        out.write_all(&self.buf)?;
        out.flush()?;
        Ok(())
    }
}

/// Encode `blocks` as a CAR stream.
pub fn encode_blocks(blocks: &[Block]) -> Vec<u8> {
    let mut writer = CarWriter::new();
    for block in blocks {
        writer.add_block(block);
    }
    writer.finish()
}

/// Size of the record `add_block` would append for `block`.
pub fn record_len(block: &Block) -> usize {
    let body_len = block.cid.encoded_len() + block.size();
    varint::encoded_len(body_len as u64) + body_len
}
