//! Row-block work queue.
//!
//! The image's rows are divided into fixed-size contiguous blocks that
//! worker threads pull off a shared FIFO. Pull-based scheduling
//! self-balances uneven per-pixel cost: a thread that lands on cheap
//! rows simply comes back for the next block instead of idling while a
//! statically assigned slice finishes elsewhere.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Rows per work block.
pub const WORK_BLOCK_SIZE: u32 = 4;

/// An inclusive range of image rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBlock {
    pub start: u32,
    pub end: u32,
}

impl RowBlock {
    /// Number of rows covered by this block.
    pub fn rows(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Partition `[0, height)` into contiguous blocks of at most
/// `block_size` rows. Blocks are mutually exclusive and collectively
/// exhaustive; the last block is shorter when `height` is not a
/// multiple of `block_size`.
pub fn row_blocks(height: u32, block_size: u32) -> Vec<RowBlock> {
    let mut blocks = Vec::new();
    let mut start = 0;
    while start < height {
        let end = (start + block_size - 1).min(height - 1);
        blocks.push(RowBlock { start, end });
        start = end + 1;
    }
    blocks
}

/// FIFO of row blocks shared between worker threads.
///
/// The mutex guards only the dequeue itself; pixel computation happens
/// entirely outside the critical section.
pub struct BlockQueue {
    inner: Mutex<VecDeque<RowBlock>>,
}

impl BlockQueue {
    pub fn new(blocks: Vec<RowBlock>) -> Self {
        Self {
            inner: Mutex::new(blocks.into()),
        }
    }

    /// Dequeue the next block; `None` means the queue is drained and
    /// the calling worker should exit.
    pub fn pop(&self) -> Option<RowBlock> {
        self.inner
            .lock()
            .expect("work queue mutex poisoned")
            .pop_front()
    }
}
