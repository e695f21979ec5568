//! Dedup-aware batched block upload for Cairn.
//!
//! [`Uploader::upload`] takes the flat block list of a built DAG and:
//!
//! 1. asks an [`ExistenceChecker`] whether each block is already stored,
//!    retrying transient failures and treating exhausted retries as "absent"
//! 2. drops the blocks that are present
//! 3. groups the rest into [`split_on_batches`] batches bounded by block
//!    count and total bytes
//! 4. hands each batch to a [`BatchSubmitter`], in order, swallowing
//!    "already applied" errors and aborting on anything else
//!
//! A failed upload is resumed by running it again: blocks that made it are
//! found by the existence check and skipped.
//!
//! Two backends implement both collaborator traits: [`LedgerBackend`] over an
//! opaque [`LedgerSession`], and [`StoreBackend`] over any local
//! [`BlockStore`](cairn_store::BlockStore).

pub mod backend;
pub mod batch;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;
pub mod uploader;

pub use backend::{CallOutcome, LedgerBackend, LedgerSession, SessionError, StoreBackend};
pub use batch::split_on_batches;
pub use config::{LedgerBackendConfig, UploadConfig};
pub use error::{ExistenceError, SubmitError, SyncError, SyncResult};
pub use transport::{BatchSubmitter, ExistenceChecker, NoProgress, ProgressSink};
pub use types::UploadReport;
pub use uploader::Uploader;
