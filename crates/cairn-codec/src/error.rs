use cairn_types::CidError;
use thiserror::Error;

/// Format errors raised while decoding binary records.
///
/// These are never retried: they mean the input is corrupt or was produced
/// by an incompatible encoder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed varint at offset {offset}: buffer ended mid-sequence")]
    MalformedVarint { offset: usize },

    #[error("varint at offset {offset} overflows 64 bits")]
    VarintOverflow { offset: usize },

    #[error("unsupported wire type {wire_type} for field {field}")]
    UnsupportedWireType { field: u64, wire_type: u8 },

    #[error("record truncated at offset {offset}: need {expected} bytes, have {actual}")]
    Truncated {
        offset: usize,
        expected: u64,
        actual: usize,
    },

    #[error("malformed node: {0}")]
    MalformedNode(String),

    #[error("malformed UnixFS metadata: {0}")]
    MalformedMetadata(String),

    #[error("invalid link CID: {0}")]
    Cid(#[from] CidError),
}

pub type CodecResult<T> = Result<T, CodecError>;
