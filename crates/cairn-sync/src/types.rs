use serde::{Deserialize, Serialize};

/// What one upload did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    /// Unique blocks whose existence was checked.
    pub checked: usize,
    /// Blocks the remote side already held.
    pub already_present: usize,
    /// Blocks in batches that were accepted or already applied.
    pub sent: usize,
    /// Batches submitted.
    pub batches: usize,
    /// Batches whose submission came back as "already applied".
    pub idempotent_batches: usize,
}

impl UploadReport {
    /// True when nothing needed sending.
    pub fn is_noop(&self) -> bool {
        self.batches == 0
    }
}
