use sha2::{Digest, Sha256};

use crate::cid::{Cid, Codec, DIGEST_LEN};

/// SHA-256 content hasher bound to a codec.
///
/// Each hasher produces version-1 CIDs for one codec: [`ContentHasher::RAW`]
/// for file bytes and [`ContentHasher::DAG_PB`] for encoded directory nodes.
/// The same bytes hashed under different codecs share a digest but not a CID.
pub struct ContentHasher {
    codec: Codec,
}

impl ContentHasher {
    /// Hasher for raw file content.
    pub const RAW: Self = Self { codec: Codec::Raw };
    /// Hasher for encoded DAG-PB nodes.
    pub const DAG_PB: Self = Self {
        codec: Codec::DagPb,
    };

    pub const fn new(codec: Codec) -> Self {
        Self { codec }
    }

    /// Hash `data` into a version-1 CID.
    pub fn hash(&self, data: &[u8]) -> Cid {
        Cid::v1(self.codec, Self::sha256(data))
    }

    /// Verify that `data` produces the expected CID under this hasher's codec.
    pub fn verify(&self, data: &[u8], expected: &Cid) -> bool {
        expected.codec() == self.codec && Self::sha256(data) == *expected.digest()
    }

    /// Bare SHA-256 digest.
    pub fn sha256(data: &[u8]) -> [u8; DIGEST_LEN] {
        Sha256::digest(data).into()
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }
}
