use std::collections::HashSet;
use std::time::Duration;

use cairn_store::Block;
use tracing::{debug, info, warn};

use crate::batch::split_on_batches;
use crate::config::UploadConfig;
use crate::error::{ExistenceError, SyncError, SyncResult};
use crate::transport::{BatchSubmitter, ExistenceChecker, ProgressSink};
use crate::types::UploadReport;

/// Drives the check, filter, batch and submit pipeline for one block list.
///
/// Checks and submissions run strictly in order; at most one batch is in
/// flight at a time.
#[derive(Clone, Debug)]
pub struct Uploader {
    config: UploadConfig,
}

impl Uploader {
    /// Fails with [`SyncError::Configuration`] if `config` is unusable.
    pub fn new(config: UploadConfig) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Upload every block of `blocks` the checker does not report as present.
    pub async fn upload<C, S, P>(
        &self,
        blocks: &[Block],
        checker: &C,
        submitter: &S,
        progress: &P,
    ) -> SyncResult<UploadReport>
    where
        C: ExistenceChecker + ?Sized,
        S: BatchSubmitter + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let mut report = UploadReport::default();

        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for block in blocks {
            if !seen.insert(block.cid) {
                continue;
            }
            if report.checked > 0 {
                pause(self.config.stagger_delay).await;
            }
            report.checked += 1;
            if self.is_present(checker, &block.cid.to_text()).await? {
                debug!(cid = %block.cid, "block already stored, skipping");
                report.already_present += 1;
            } else {
                missing.push(block.clone());
            }
        }

        let batches = split_on_batches(
            missing,
            self.config.max_batch_blocks,
            self.config.max_batch_bytes,
        );
        let total_blocks: usize = batches.iter().map(Vec::len).sum();
        let total_batches = batches.len();
        info!(
            checked = report.checked,
            present = report.already_present,
            blocks = total_blocks,
            batches = total_batches,
            "uploading missing blocks"
        );

        for (index, batch) in batches.iter().enumerate() {
            let bytes: usize = batch.iter().map(Block::size).sum();
            match submitter.submit_batch(batch).await {
                Ok(()) => {
                    debug!(batch = index, blocks = batch.len(), bytes, "batch stored");
                }
                Err(e) if self.config.is_idempotence_signal(&e) => {
                    info!(batch = index, error = %e, "batch already applied");
                    report.idempotent_batches += 1;
                }
                Err(e) => {
                    warn!(batch = index, error = %e, "batch submission failed, aborting upload");
                    return Err(SyncError::Submission {
                        batch: index,
                        total: total_batches,
                        source: e,
                    });
                }
            }
            report.batches += 1;
            report.sent += batch.len();
            info!(sent = report.sent, total = total_blocks, "upload progress");
            progress.report(report.sent, total_blocks);
        }

        Ok(report)
    }

    /// One existence check with retries. Exhausted retries count as absent.
    async fn is_present<C>(&self, checker: &C, cid: &str) -> SyncResult<bool>
    where
        C: ExistenceChecker + ?Sized,
    {
        let attempts = self.config.retry_count;
        for attempt in 1..=attempts {
            match checker.has_block(cid).await {
                Ok(present) => return Ok(present),
                Err(ExistenceError::Misconfigured(msg)) => {
                    return Err(SyncError::Configuration(msg));
                }
                Err(ExistenceError::Transient(msg)) => {
                    warn!(cid, attempt, attempts, error = %msg, "existence check failed");
                    if attempt < attempts {
                        pause(self.config.retry_delay).await;
                    }
                }
            }
        }
        warn!(cid, "existence unknown after retries, treating as absent");
        Ok(false)
    }
}

impl Default for Uploader {
    fn default() -> Self {
        Self {
            config: UploadConfig::default(),
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
