use cairn_store::Block;

/// Partition `blocks`, in order, into batches of at most `max_blocks`
/// blocks whose content sizes sum to less than `max_bytes`.
///
/// A batch is sealed as soon as the next block would break either bound. A
/// block that is `max_bytes` or larger on its own still gets a batch, alone.
pub fn split_on_batches(blocks: Vec<Block>, max_blocks: usize, max_bytes: usize) -> Vec<Vec<Block>> {
    let mut batches = Vec::new();
    let mut current: Vec<Block> = Vec::new();
    let mut current_bytes = 0usize;

    for block in blocks {
        let size = block.size();
        let full = current.len() >= max_blocks || current_bytes + size >= max_bytes;
        if !current.is_empty() && full {
            batches.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current_bytes += size;
        current.push(block);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
