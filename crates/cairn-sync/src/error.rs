use thiserror::Error;

/// Failure of a single existence check.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExistenceError {
    /// Worth retrying: timeouts, transport hiccups, gateway errors.
    #[error("transient existence-check failure: {0}")]
    Transient(String),

    /// The checker cannot work at all, e.g. missing credentials.
    #[error("existence checker misconfigured: {0}")]
    Misconfigured(String),
}

/// Failure of a batch submission.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The remote side already holds the batch.
    #[error("batch already applied: {0}")]
    AlreadyApplied(String),

    #[error("batch submission failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("batch {batch} of {total} rejected: {source}")]
    Submission {
        batch: usize,
        total: usize,
        #[source]
        source: SubmitError,
    },
}

pub type SyncResult<T> = Result<T, SyncError>;
