//! Content identifiers.
//!
//! Two binary layouts are supported:
//!
//! - **Version 0**: `0x12 0x20 <32-byte digest>`. Implicitly SHA-256 and
//!   DAG-PB; there is no version or codec byte.
//! - **Version 1**: `<version> <codec> <hash algorithm> <digest length> <digest>`,
//!   one byte each for the four header fields.
//!
//! The text form is the binary CID in unpadded base32-lower multibase,
//! which yields the familiar `bafk...` (raw) and `bafy...` (DAG-PB) prefixes.

use std::fmt;
use std::str::FromStr;

use multibase::Base;
use serde::{Deserialize, Serialize};

use crate::error::{CidError, CidResult};
use crate::hasher::ContentHasher;

/// Digest length of the only supported hash function.
pub const DIGEST_LEN: usize = 32;

/// Fixed prefix of a version-0 CID (SHA-256 code, 32-byte length).
pub const V0_PREFIX: [u8; 2] = [0x12, 0x20];

const V1_HEADER_LEN: usize = 4;

/// CID version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CidVersion {
    /// Legacy layout with implicit SHA-256/DAG-PB.
    V0,
    /// Self-describing layout.
    V1,
}

impl CidVersion {
    /// Numeric version as written in the binary form.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
        }
    }
}

/// How a block's bytes are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Codec {
    /// Opaque file bytes.
    Raw,
    /// Protobuf-encoded DAG node (directories).
    DagPb,
}

impl Codec {
    /// Multicodec code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Raw => 0x55,
            Self::DagPb => 0x70,
        }
    }

    /// Parse a multicodec code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x55 => Some(Self::Raw),
            0x70 => Some(Self::DagPb),
            _ => None,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::DagPb => write!(f, "dag-pb"),
        }
    }
}

/// Digest function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Sha2_256,
}

impl HashAlgorithm {
    /// Multihash code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Sha2_256 => 0x12,
        }
    }

    /// Parse a multihash code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x12 => Some(Self::Sha2_256),
            _ => None,
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha2_256 => DIGEST_LEN,
        }
    }
}

/// Content identifier for a block.
///
/// A `Cid` binds a SHA-256 digest to the codec that interprets the block.
/// Equal content under the same codec always yields the same `Cid`, which
/// is what lets identical blocks collapse into a single upload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cid {
    version: CidVersion,
    codec: Codec,
    hash: HashAlgorithm,
    digest: [u8; DIGEST_LEN],
}

impl Cid {
    /// A version-0 CID (always DAG-PB, SHA-256).
    pub fn v0(digest: [u8; DIGEST_LEN]) -> Self {
        Self {
            version: CidVersion::V0,
            codec: Codec::DagPb,
            hash: HashAlgorithm::Sha2_256,
            digest,
        }
    }

    /// A version-1 SHA-256 CID for the given codec.
    pub fn v1(codec: Codec, digest: [u8; DIGEST_LEN]) -> Self {
        Self {
            version: CidVersion::V1,
            codec,
            hash: HashAlgorithm::Sha2_256,
            digest,
        }
    }

    pub fn version(&self) -> CidVersion {
        self.version
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Length of the binary form.
    pub fn encoded_len(&self) -> usize {
        match self.version {
            CidVersion::V0 => V0_PREFIX.len() + DIGEST_LEN,
            CidVersion::V1 => V1_HEADER_LEN + DIGEST_LEN,
        }
    }

    /// Pack into the canonical binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        out
    }

    /// Append the binary form to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match self.version {
            CidVersion::V0 => out.extend_from_slice(&V0_PREFIX),
            CidVersion::V1 => out.extend_from_slice(&[
                self.version.as_u8(),
                self.codec.code(),
                self.hash.code(),
                DIGEST_LEN as u8,
            ]),
        }
        out.extend_from_slice(&self.digest);
    }

    /// Unpack a binary CID that must span all of `data`.
    pub fn from_bytes(data: &[u8]) -> CidResult<Self> {
        let (cid, consumed) = Self::read_prefix(data)?;
        if consumed != data.len() {
            return Err(CidError::TrailingBytes(data.len() - consumed));
        }
        Ok(cid)
    }

    /// Unpack a binary CID from the front of `data`.
    ///
    /// CIDs are self-delimiting, so this returns the CID together with the
    /// number of bytes it occupied. Anything after that is left untouched.
    pub fn read_prefix(data: &[u8]) -> CidResult<(Self, usize)> {
        if data.len() >= V0_PREFIX.len() && data[..V0_PREFIX.len()] == V0_PREFIX {
            let end = V0_PREFIX.len() + DIGEST_LEN;
            let digest = take_digest(data, V0_PREFIX.len(), end)?;
            return Ok((Self::v0(digest), end));
        }

        if data.len() < V1_HEADER_LEN {
            return Err(CidError::Truncated {
                expected: V1_HEADER_LEN,
                actual: data.len(),
            });
        }
        let version = data[0];
        if version != 1 {
            return Err(CidError::UnsupportedCidVersion(version));
        }
        let hash =
            HashAlgorithm::from_code(data[2]).ok_or(CidError::UnsupportedHashAlgorithm(data[2]))?;
        let digest_len = data[3];
        if digest_len as usize != hash.digest_len() {
            return Err(CidError::InvalidDigestLength(digest_len));
        }
        let codec = Codec::from_code(data[1]).ok_or(CidError::UnsupportedCodec(data[1]))?;

        let end = V1_HEADER_LEN + DIGEST_LEN;
        let digest = take_digest(data, V1_HEADER_LEN, end)?;
        Ok((Self::v1(codec, digest), end))
    }

    /// Text form: unpadded base32-lower multibase of the binary CID.
    pub fn to_text(&self) -> String {
        multibase::encode(Base::Base32Lower, self.to_bytes())
    }

    /// Parse the text form. Any multibase prefix is accepted.
    pub fn from_text(s: &str) -> CidResult<Self> {
        let (_, bytes) = multibase::decode(s).map_err(|e| CidError::InvalidText(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Check that `content` hashes to this CID's digest.
    pub fn validate(&self, content: &[u8]) -> CidResult<()> {
        let computed = ContentHasher::sha256(content);
        if computed != self.digest {
            return Err(CidError::HashMismatch {
                expected: hex::encode(self.digest),
                computed: hex::encode(computed),
            });
        }
        Ok(())
    }

    /// First four digest bytes in hex, for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.digest[..4])
    }
}

fn take_digest(data: &[u8], start: usize, end: usize) -> CidResult<[u8; DIGEST_LEN]> {
    if data.len() < end {
        return Err(CidError::Truncated {
            expected: end,
            actual: data.len(),
        });
    }
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&data[start..end]);
    Ok(digest)
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cid(v{} {} {})",
            self.version.as_u8(),
            self.codec,
            self.short_hex()
        )
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Cid {
    type Err = CidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl From<Cid> for String {
    fn from(cid: Cid) -> Self {
        cid.to_text()
    }
}

impl TryFrom<String> for Cid {
    type Error = CidError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_text(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn legacy_cid_decodes() {
        let mut bytes = vec![0x12, 0x20];
        bytes.extend_from_slice(&[0u8; 32]);
        let cid = Cid::from_bytes(&bytes).unwrap();
        assert_eq!(cid.version(), CidVersion::V0);
        assert_eq!(cid.codec(), Codec::DagPb);
        assert_eq!(cid.hash_algorithm(), HashAlgorithm::Sha2_256);
        assert_eq!(cid.digest(), &[0u8; 32]);
        assert_eq!(cid.to_bytes(), bytes);
    }

    #[test]
    fn v1_layout_is_header_then_digest() {
        let cid = Cid::v1(Codec::Raw, [7u8; 32]);
        let bytes = cid.to_bytes();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..4], &[0x01, 0x55, 0x12, 0x20]);
        assert_eq!(&bytes[4..], &[7u8; 32]);
        assert_eq!(cid.encoded_len(), 36);
    }

    #[test]
    fn v0_layout_is_prefix_then_digest() {
        let cid = Cid::v0([9u8; 32]);
        let bytes = cid.to_bytes();
        assert_eq!(bytes.len(), 34);
        assert_eq!(&bytes[..2], &V0_PREFIX);
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = vec![0x02, 0x55, 0x12, 0x20];
        bytes.extend_from_slice(&[0u8; 32]);
        assert_eq!(
            Cid::from_bytes(&bytes).unwrap_err(),
            CidError::UnsupportedCidVersion(2)
        );
    }

    #[test]
    fn rejects_non_sha256() {
        let mut bytes = vec![0x01, 0x55, 0x13, 0x40];
        bytes.extend_from_slice(&[0u8; 64]);
        assert_eq!(
            Cid::from_bytes(&bytes).unwrap_err(),
            CidError::UnsupportedHashAlgorithm(0x13)
        );
    }

    #[test]
    fn rejects_wrong_digest_length() {
        let mut bytes = vec![0x01, 0x55, 0x12, 0x10];
        bytes.extend_from_slice(&[0u8; 16]);
        assert_eq!(
            Cid::from_bytes(&bytes).unwrap_err(),
            CidError::InvalidDigestLength(0x10)
        );
    }

    #[test]
    fn rejects_unknown_codec() {
        let mut bytes = vec![0x01, 0x71, 0x12, 0x20];
        bytes.extend_from_slice(&[0u8; 32]);
        assert_eq!(
            Cid::from_bytes(&bytes).unwrap_err(),
            CidError::UnsupportedCodec(0x71)
        );
    }

    #[test]
    fn truncated_digest() {
        let bytes = [0x01, 0x55, 0x12, 0x20, 0xaa, 0xbb];
        assert!(matches!(
            Cid::from_bytes(&bytes).unwrap_err(),
            CidError::Truncated { expected: 36, actual: 6 }
        ));
        assert!(matches!(
            Cid::from_bytes(&[]).unwrap_err(),
            CidError::Truncated { .. }
        ));
    }

    #[test]
    fn read_prefix_leaves_payload() {
        let cid = Cid::v1(Codec::DagPb, [3u8; 32]);
        let mut bytes = cid.to_bytes();
        bytes.extend_from_slice(b"payload");
        let (parsed, consumed) = Cid::read_prefix(&bytes).unwrap();
        assert_eq!(parsed, cid);
        assert_eq!(&bytes[consumed..], b"payload");
        assert_eq!(
            Cid::from_bytes(&bytes).unwrap_err(),
            CidError::TrailingBytes(7)
        );
    }

    #[test]
    fn text_prefixes() {
        let raw = Cid::v1(Codec::Raw, [1u8; 32]);
        let pb = Cid::v1(Codec::DagPb, [1u8; 32]);
        assert!(raw.to_text().starts_with("bafkrei"));
        assert!(pb.to_text().starts_with("bafybei"));
        assert!(!raw.to_text().contains('='));
    }

    #[test]
    fn text_roundtrip() {
        let cid = Cid::v1(Codec::Raw, ContentHasher::sha256(b"hello"));
        let text = cid.to_string();
        let parsed: Cid = text.parse().unwrap();
        assert_eq!(parsed, cid);
    }

    #[test]
    fn invalid_text() {
        assert!(matches!(
            Cid::from_text("").unwrap_err(),
            CidError::InvalidText(_)
        ));
        assert!(matches!(
            Cid::from_text("b!!!").unwrap_err(),
            CidError::InvalidText(_)
        ));
    }

    #[test]
    fn validate_detects_tampering() {
        let cid = Cid::v1(Codec::Raw, ContentHasher::sha256(b"original"));
        assert!(cid.validate(b"original").is_ok());
        assert!(matches!(
            cid.validate(b"tampered").unwrap_err(),
            CidError::HashMismatch { .. }
        ));
    }

    #[test]
    fn serde_uses_text() {
        let cid = Cid::v1(Codec::DagPb, [5u8; 32]);
        let json = serde_json::to_string(&cid).unwrap();
        assert_eq!(json, format!("\"{}\"", cid.to_text()));
        let parsed: Cid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cid);
    }

    #[test]
    fn debug_is_compact() {
        let cid = Cid::v1(Codec::Raw, [0xab; 32]);
        assert_eq!(format!("{cid:?}"), "Cid(v1 raw abababab)");
    }

    proptest! {
        #[test]
        fn binary_roundtrip(v0 in any::<bool>(), pb in any::<bool>(), digest in any::<[u8; 32]>()) {
            let cid = match (v0, pb) {
                (true, _) => Cid::v0(digest),
                (false, true) => Cid::v1(Codec::DagPb, digest),
                (false, false) => Cid::v1(Codec::Raw, digest),
            };
            let bytes = cid.to_bytes();
            let parsed = Cid::from_bytes(&bytes).unwrap();
            prop_assert_eq!(parsed, cid);
            prop_assert_eq!(parsed.to_bytes(), bytes);
            prop_assert_eq!(Cid::from_text(&cid.to_text()).unwrap(), cid);
        }

        #[test]
        fn content_addressing(content in proptest::collection::vec(any::<u8>(), 1..512), idx in any::<usize>()) {
            let cid = Cid::v1(Codec::Raw, ContentHasher::sha256(&content));
            prop_assert!(cid.validate(&content).is_ok());
            let mut mutated = content.clone();
            let i = idx % mutated.len();
            mutated[i] ^= 0x01;
            let is_mismatch = matches!(cid.validate(&mutated), Err(CidError::HashMismatch { .. }));
            prop_assert!(is_mismatch);
        }
    }
}
