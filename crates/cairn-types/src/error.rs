use thiserror::Error;

/// Errors produced while decoding or validating content identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CidError {
    #[error("unsupported CID version: {0}")]
    UnsupportedCidVersion(u8),

    #[error("unsupported hash algorithm: 0x{0:02x} (only SHA-256 is supported)")]
    UnsupportedHashAlgorithm(u8),

    #[error("invalid digest length: expected 32, got {0}")]
    InvalidDigestLength(u8),

    #[error("unsupported codec: 0x{0:02x}")]
    UnsupportedCodec(u8),

    #[error("CID truncated: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("{0} trailing bytes after CID")]
    TrailingBytes(usize),

    #[error("invalid CID text: {0}")]
    InvalidText(String),

    #[error("hash mismatch: CID digest {expected}, content hashes to {computed}")]
    HashMismatch { expected: String, computed: String },
}

/// Result alias for CID operations.
pub type CidResult<T> = Result<T, CidError>;
