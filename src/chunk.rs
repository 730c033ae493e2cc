//! Partitioning of the flat ray-index space into worker chunks.

use std::ops::Range;

/// Half-open range `[start, end)` of ray slots handled by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// First slot in the chunk.
    pub start: usize,
    /// One past the last slot in the chunk.
    pub end: usize,
}

impl Chunk {
    /// Number of slots in the chunk.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the chunk holds no slots.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slot range covered by the chunk.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `[0, n)` into `thread_count` ordered, contiguous chunks.
///
/// Sizes differ by at most one; the first `n % thread_count` chunks take the
/// extra slot. When `n < thread_count` the trailing chunks are empty.
/// A `thread_count` of zero is treated as one.
pub fn compute_chunks(n: usize, thread_count: usize) -> Vec<Chunk> {
    let thread_count = thread_count.max(1);
    let base = n / thread_count;
    let remainder = n % thread_count;

    let mut chunks = Vec::with_capacity(thread_count);
    let mut start = 0;
    for k in 0..thread_count {
        let size = base + usize::from(k < remainder);
        chunks.push(Chunk {
            start,
            end: start + size,
        });
        start += size;
    }
    chunks
}
