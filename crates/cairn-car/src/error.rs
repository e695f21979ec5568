use cairn_codec::CodecError;
use cairn_types::{Cid, CidError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarError {
    #[error("truncated container at offset {offset}: record declares {declared} bytes, {remaining} remain")]
    TruncatedContainer {
        offset: usize,
        declared: u64,
        remaining: usize,
    },

    #[error("unsupported block codec 0x{0:02x}")]
    UnsupportedBlockCodec(u8),

    #[error("block {cid} at offset {offset} failed validation: {source}")]
    Integrity {
        offset: usize,
        cid: Cid,
        #[source]
        source: CidError,
    },

    #[error("invalid record CID: {0}")]
    Cid(#[from] CidError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CarResult<T> = Result<T, CarError>;
