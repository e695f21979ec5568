use bytes::Bytes;
use cairn_codec::PbNode;
use cairn_store::Block;
use cairn_types::{Cid, CidError, Codec};

use crate::error::{CarError, CarResult};
use crate::reader::CarRecord;

/// A decoded CAR record.
///
/// `data` is the payload after the CID and has already been checked against
/// the CID's digest. For DAG-PB records `node` holds the decoded node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarEntry {
    pub cid: Cid,
    pub data: Bytes,
    pub node: Option<PbNode>,
    pub start_offset: usize,
}

impl CarEntry {
    /// Split a record into CID and payload, validate, and decode by codec.
    pub fn decode(record: &CarRecord) -> CarResult<Self> {
        let (cid, consumed) = Cid::read_prefix(&record.data).map_err(|e| match e {
            CidError::UnsupportedCodec(code) => CarError::UnsupportedBlockCodec(code),
            other => CarError::Cid(other),
        })?;
        let data = record.data.slice(consumed..);

        cid.validate(&data).map_err(|source| CarError::Integrity {
            offset: record.start_offset,
            cid,
            source,
        })?;

        let node = match cid.codec() {
            Codec::Raw => None,
            Codec::DagPb => Some(PbNode::decode(&data)?),
        };

        Ok(Self {
            cid,
            data,
            node,
            start_offset: record.start_offset,
        })
    }

    pub fn codec(&self) -> Codec {
        self.cid.codec()
    }

    pub fn into_block(self) -> Block {
        Block::new(self.cid, self.data)
    }
}
