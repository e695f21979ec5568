use bytes::Bytes;
use cairn_types::{Cid, CidResult, ContentHasher};

/// An immutable unit of storage: content bytes plus the CID that names them.
///
/// Two blocks with equal CIDs are interchangeable. Constructors that hash
/// their input ([`Block::raw`], [`Block::dag_pb`]) always produce a valid
/// block; [`Block::new`] trusts its caller and should be followed by
/// [`Block::verify`] when the bytes come from outside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub cid: Cid,
    pub data: Bytes,
}

impl Block {
    /// Pair `data` with a CID without checking it.
    pub fn new(cid: Cid, data: impl Into<Bytes>) -> Self {
        Self {
            cid,
            data: data.into(),
        }
    }

    /// A raw block: file content addressed by a version-1 raw CID.
    pub fn raw(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            cid: ContentHasher::RAW.hash(&data),
            data,
        }
    }

    /// A DAG-PB block: an encoded node addressed by a version-1 dag-pb CID.
    pub fn dag_pb(encoded: impl Into<Bytes>) -> Self {
        let data = encoded.into();
        Self {
            cid: ContentHasher::DAG_PB.hash(&data),
            data,
        }
    }

    /// Content length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check that the content hashes to the CID's digest.
    pub fn verify(&self) -> CidResult<()> {
        self.cid.validate(&self.data)
    }
}
