//! Concrete collaborators: a remote ledger contract and a local block store.

use async_trait::async_trait;
use cairn_car::encode_blocks;
use cairn_store::{Block, BlockStore};
use cairn_types::Cid;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::LedgerBackendConfig;
use crate::error::{ExistenceError, SubmitError};
use crate::transport::{BatchSubmitter, ExistenceChecker};

/// Error reported by a [`LedgerSession`].
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// RPC unreachable, timed out, or returned garbage.
    #[error("transport: {0}")]
    Transport(String),

    /// The session has no usable account or key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The call reached the contract and the contract rejected it.
    #[error("execution: {0}")]
    Execution(String),
}

/// Result of a signed call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    pub transaction_hash: String,
}

/// An authenticated account on the ledger.
///
/// Key management, signing and RPC live behind this trait.
#[async_trait]
pub trait LedgerSession: Send + Sync {
    /// Read-only contract call with JSON arguments.
    async fn view(&self, contract: &str, method: &str, args: Value) -> Result<Value, SessionError>;

    /// Signed contract call with raw argument bytes.
    async fn call(
        &self,
        contract: &str,
        method: &str,
        args: Vec<u8>,
        gas: u64,
        deposit: u128,
    ) -> Result<CallOutcome, SessionError>;
}

/// Uploads to a store contract through a [`LedgerSession`].
///
/// Existence is a view call `has_block({"cid": <text>})`. A batch is one
/// signed store call whose argument bytes are the batch as a CAR stream.
pub struct LedgerBackend<S> {
    session: S,
    config: LedgerBackendConfig,
}

impl<S: LedgerSession> LedgerBackend<S> {
    pub fn new(session: S, config: LedgerBackendConfig) -> Self {
        Self { session, config }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn config(&self) -> &LedgerBackendConfig {
        &self.config
    }
}

#[async_trait]
impl<S: LedgerSession> ExistenceChecker for LedgerBackend<S> {
    async fn has_block(&self, cid: &str) -> Result<bool, ExistenceError> {
        let result = self
            .session
            .view(&self.config.contract, &self.config.view_method, json!({ "cid": cid }))
            .await
            .map_err(|e| match e {
                SessionError::Unauthorized(msg) => ExistenceError::Misconfigured(msg),
                other => ExistenceError::Transient(other.to_string()),
            })?;
        match result {
            Value::Bool(present) => Ok(present),
            Value::Null => Ok(false),
            other => Err(ExistenceError::Transient(format!(
                "unexpected {} result: {other}",
                self.config.view_method
            ))),
        }
    }
}

#[async_trait]
impl<S: LedgerSession> BatchSubmitter for LedgerBackend<S> {
    async fn submit_batch(&self, batch: &[Block]) -> Result<(), SubmitError> {
        let args = encode_blocks(batch);
        let outcome = self
            .session
            .call(
                &self.config.contract,
                &self.config.store_method,
                args,
                self.config.gas,
                self.config.deposit,
            )
            .await
            .map_err(|e| SubmitError::Failed(e.to_string()))?;
        debug!(
            tx = %outcome.transaction_hash,
            blocks = batch.len(),
            "store call accepted"
        );
        Ok(())
    }
}

/// Uploads into a local [`BlockStore`].
///
/// Every block of a batch is verified before any is written, so a batch
/// carrying a corrupt block leaves the store untouched. An I/O failure part
/// way through can still leave a prefix of the batch stored; re-running the
/// upload skips those blocks.
///
/// A batch whose blocks were all present already is reported as
/// [`SubmitError::AlreadyApplied`], the same signal a remote store gives.
pub struct StoreBackend<S> {
    store: S,
}

impl<S: BlockStore> StoreBackend<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[async_trait]
impl<S: BlockStore> ExistenceChecker for StoreBackend<S> {
    async fn has_block(&self, cid: &str) -> Result<bool, ExistenceError> {
        let cid = Cid::from_text(cid)
            .map_err(|e| ExistenceError::Misconfigured(format!("invalid CID {cid:?}: {e}")))?;
        self.store
            .has(&cid)
            .map_err(|e| ExistenceError::Transient(e.to_string()))
    }
}

#[async_trait]
impl<S: BlockStore> BatchSubmitter for StoreBackend<S> {
    async fn submit_batch(&self, batch: &[Block]) -> Result<(), SubmitError> {
        for block in batch {
            block
                .verify()
                .map_err(|e| SubmitError::Failed(format!("block {} rejected: {e}", block.cid)))?;
        }
        let written = self
            .store
            .put_many(batch)
            .map_err(|e| SubmitError::Failed(e.to_string()))?;
        if !batch.is_empty() && written.iter().all(|w| !w) {
            return Err(SubmitError::AlreadyApplied(format!(
                "all {} blocks already stored",
                batch.len()
            )));
        }
        Ok(())
    }
}
