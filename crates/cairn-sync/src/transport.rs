use async_trait::async_trait;
use cairn_store::Block;

use crate::error::{ExistenceError, SubmitError};

/// Answers whether the remote store already holds a block.
#[async_trait]
pub trait ExistenceChecker: Send + Sync {
    /// `cid` is the block's CID in text form.
    async fn has_block(&self, cid: &str) -> Result<bool, ExistenceError>;
}

/// Sends one batch of blocks to the remote store as a single atomic call.
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
    async fn submit_batch(&self, batch: &[Block]) -> Result<(), SubmitError>;
}

/// Receives `(blocks_sent, blocks_to_send)` after each batch.
pub trait ProgressSink: Send + Sync {
    fn report(&self, sent: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn report(&self, sent: usize, total: usize) {
        self(sent, total)
    }
}

/// Discards progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _sent: usize, _total: usize) {}
}
