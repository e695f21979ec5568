use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SubmitError, SyncError, SyncResult};

/// Tunables for one upload. Built once per call and never mutated by it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Attempts per existence check, first attempt included.
    pub retry_count: u32,
    /// Pause between failed existence-check attempts.
    pub retry_delay: Duration,
    /// Pause between consecutive existence checks.
    pub stagger_delay: Duration,
    /// Maximum blocks per batch.
    pub max_batch_blocks: usize,
    /// Batches stay strictly under this many content bytes, unless a single
    /// block is larger on its own.
    pub max_batch_bytes: usize,
    /// Lower-case fragments that mark a submission error as "already applied".
    pub idempotence_markers: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
            stagger_delay: Duration::from_millis(25),
            max_batch_blocks: 7,
            max_batch_bytes: 256 * 1024,
            idempotence_markers: vec![
                "already exists".into(),
                "already stored".into(),
                "already applied".into(),
            ],
        }
    }
}

impl UploadConfig {
    /// Default bounds with every delay set to zero.
    pub fn without_delays() -> Self {
        Self {
            retry_delay: Duration::ZERO,
            stagger_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.retry_count == 0 {
            return Err(SyncError::Configuration(
                "retry_count must be at least 1".into(),
            ));
        }
        if self.max_batch_blocks == 0 {
            return Err(SyncError::Configuration(
                "max_batch_blocks must be at least 1".into(),
            ));
        }
        if self.max_batch_bytes == 0 {
            return Err(SyncError::Configuration(
                "max_batch_bytes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether `error` means the batch is already on the remote side.
    pub fn is_idempotence_signal(&self, error: &SubmitError) -> bool {
        match error {
            SubmitError::AlreadyApplied(_) => true,
            SubmitError::Failed(message) => {
                let message = message.to_lowercase();
                self.idempotence_markers
                    .iter()
                    .any(|marker| message.contains(&marker.to_lowercase()))
            }
        }
    }
}

/// Where and how the ledger backend talks to the remote store contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerBackendConfig {
    /// Account id of the store contract.
    pub contract: String,
    /// Read-only method answering `{"cid": <text>}` with a boolean.
    pub view_method: String,
    /// Signed method receiving a batch as a CAR stream.
    pub store_method: String,
    /// Gas attached to each store call.
    pub gas: u64,
    /// Deposit attached to each store call.
    pub deposit: u128,
}

impl Default for LedgerBackendConfig {
    fn default() -> Self {
        Self {
            contract: "nearfs.near".into(),
            view_method: "has_block".into(),
            store_method: "fs_store".into(),
            gas: 300_000_000_000_000,
            deposit: 0,
        }
    }
}

impl LedgerBackendConfig {
    pub fn for_contract(contract: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            ..Default::default()
        }
    }
}
