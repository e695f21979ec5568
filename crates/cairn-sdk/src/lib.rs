//! High-level SDK for Cairn.
//!
//! [`Cairn`] wraps an upload backend and turns a list of files into a root
//! CID: build the DAG, skip what the backend already has, send the rest in
//! batches. The free functions [`build`], [`export_car`] and [`import_car`]
//! need no backend at all.

pub mod client;
pub mod error;

pub use client::{build, export_car, import_car, Cairn, ImportSummary, Uploaded};
pub use error::{SdkError, SdkResult};

// Re-export key types
pub use cairn_dag::{BuildOutput, InputFile};
pub use cairn_store::{Block, BlockStore, FsBlockStore, InMemoryBlockStore};
pub use cairn_sync::{
    BatchSubmitter, ExistenceChecker, LedgerBackend, LedgerBackendConfig, LedgerSession,
    NoProgress, ProgressSink, StoreBackend, UploadConfig, UploadReport,
};
pub use cairn_types::{Cid, Codec};
