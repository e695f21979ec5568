use cairn_types::{Cid, CidError};

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(Cid),

    /// A block's bytes do not match its CID.
    #[error("corrupt block {cid}: {source}")]
    Corrupt {
        cid: Cid,
        #[source]
        source: CidError,
    },

    /// A stored key could not be parsed back into a CID.
    #[error("invalid block key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: CidError,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
