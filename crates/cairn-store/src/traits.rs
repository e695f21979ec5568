use cairn_types::Cid;

use crate::block::Block;
use crate::error::StoreResult;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written. The same CID always maps to the same bytes.
/// - `put` verifies the block's digest and stores nothing on mismatch.
/// - `put` of an already-present block is a no-op that reports `false`.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlockStore: Send + Sync {
    /// Read a block by CID.
    ///
    /// Returns `Ok(None)` if the block does not exist.
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>>;

    /// Verify and write a block. Returns `true` if it was not already present.
    fn put(&self, block: &Block) -> StoreResult<bool>;

    /// Check whether a block exists in the store.
    fn has(&self, cid: &Cid) -> StoreResult<bool>;

    /// Delete a block. Returns `true` if the block existed.
    fn delete(&self, cid: &Cid) -> StoreResult<bool>;

    /// Read several blocks. Default implementation calls `get()` for each CID.
    fn get_many(&self, cids: &[Cid]) -> StoreResult<Vec<Option<Block>>> {
        cids.iter().map(|cid| self.get(cid)).collect()
    }

    /// Write several blocks. Default implementation calls `put()` for each
    /// block and stops at the first error; blocks written before it stay.
    fn put_many(&self, blocks: &[Block]) -> StoreResult<Vec<bool>> {
        blocks.iter().map(|block| self.put(block)).collect()
    }
}
