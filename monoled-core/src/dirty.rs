//! Dirty byte tracking
//!
//! Records which framebuffer bytes changed since the last successful
//! flush and turns them into a [`WritePlan`]: runs of consecutive columns
//! on the same page, each of which costs one addressing sequence plus one
//! data burst on the bus.
//!
//! Every incremental run pays a fixed addressing overhead, while a full
//! frame pays it once for the whole buffer. Past one seventh of the buffer
//! touched the full frame is cheaper, so the plan falls back to it.

use heapless::Vec;

use crate::framebuffer::MAX_BUFFER_LEN;

/// Dirty fraction (1/N of the buffer) above which a full update is used
pub const FULL_UPDATE_RATIO: usize = 7;

/// Most ranges an incremental plan can hold
pub const MAX_RANGES: usize = MAX_BUFFER_LEN / FULL_UPDATE_RATIO + 1;

const WORD_BITS: usize = 32;
const WORDS: usize = MAX_BUFFER_LEN.div_ceil(WORD_BITS);

/// A run of consecutive dirty columns on one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteRange {
    /// Page (8-row band) index
    pub page: u8,
    /// First column of the run
    pub col_start: u8,
    /// Number of columns (bytes) in the run
    pub len: u8,
}

impl WriteRange {
    /// Last column of the run (inclusive)
    pub fn col_end(&self) -> u8 {
        self.col_start + self.len - 1
    }

    /// Framebuffer byte index of the first column
    pub fn start_index(&self, width: usize) -> usize {
        self.page as usize * width + self.col_start as usize
    }
}

/// Bytes to transmit on the next flush
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WritePlan {
    /// Transmit the whole framebuffer
    Full,
    /// Transmit only these ranges, page-major and column-ascending
    Ranges(Vec<WriteRange, MAX_RANGES>),
}

impl WritePlan {
    /// Nothing to transmit
    pub fn is_empty(&self) -> bool {
        matches!(self, WritePlan::Ranges(r) if r.is_empty())
    }

    /// Whether this is the full-frame fallback
    pub fn is_full(&self) -> bool {
        matches!(self, WritePlan::Full)
    }

    /// Incremental ranges (empty for a full plan)
    pub fn ranges(&self) -> &[WriteRange] {
        match self {
            WritePlan::Full => &[],
            WritePlan::Ranges(r) => r,
        }
    }
}

/// Set of framebuffer bytes modified since the last flush
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    bits: [u32; WORDS],
    width: usize,
    len: usize,
    count: usize,
}

impl DirtyTracker {
    /// Create an empty tracker for a buffer of `len` bytes, `width` per page
    pub fn new(width: usize, len: usize) -> Self {
        Self {
            bits: [0; WORDS],
            width: width.max(1),
            len: len.min(MAX_BUFFER_LEN),
            count: 0,
        }
    }

    /// Mark a byte dirty; indices past the buffer are ignored
    pub fn mark(&mut self, idx: usize) {
        if idx >= self.len {
            return;
        }
        let (word, bit) = (idx / WORD_BITS, 1u32 << (idx % WORD_BITS));
        if self.bits[word] & bit == 0 {
            self.bits[word] |= bit;
            self.count += 1;
        }
    }

    /// Mark every byte dirty
    pub fn mark_all(&mut self) {
        for idx in 0..self.len {
            self.mark(idx);
        }
    }

    /// Whether a byte is pending
    pub fn is_marked(&self, idx: usize) -> bool {
        idx < self.len && self.bits[idx / WORD_BITS] & (1 << (idx % WORD_BITS)) != 0
    }

    /// Number of distinct dirty bytes
    pub fn count(&self) -> usize {
        self.count
    }

    /// No bytes pending
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Forget all pending bytes
    pub fn clear(&mut self) {
        self.bits = [0; WORDS];
        self.count = 0;
    }

    /// Whether `count` dirty bytes out of `total` warrant a full update
    pub fn exceeds_threshold(count: usize, total: usize) -> bool {
        count * FULL_UPDATE_RATIO > total
    }

    /// Dirty indices in ascending order (page-major, column-ascending)
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&idx| self.is_marked(idx))
    }

    /// Build the write plan without clearing the set
    ///
    /// The set is kept so that a failed transfer can be retried; call
    /// [`clear`](Self::clear) once the plan has been transmitted.
    pub fn plan(&self) -> WritePlan {
        if Self::exceeds_threshold(self.count, self.len) {
            return WritePlan::Full;
        }

        let mut ranges: Vec<WriteRange, MAX_RANGES> = Vec::new();
        for idx in self.indices() {
            let page = (idx / self.width) as u8;
            let col = (idx % self.width) as u8;

            if let Some(last) = ranges.last_mut() {
                if last.page == page && last.col_end() as usize + 1 == col as usize {
                    last.len += 1;
                    continue;
                }
            }
            // Below the threshold there are at most MAX_RANGES - 1 dirty bytes
            let _ = ranges.push(WriteRange {
                page,
                col_start: col,
                len: 1,
            });
        }
        WritePlan::Ranges(ranges)
    }

    /// Build the write plan and clear the set
    pub fn drain(&mut self) -> WritePlan {
        let plan = self.plan();
        self.clear();
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(page: u8, col_start: u8, len: u8) -> WriteRange {
        WriteRange {
            page,
            col_start,
            len,
        }
    }

    #[test]
    fn test_mark_is_a_set() {
        let mut dirty = DirtyTracker::new(128, 1024);
        dirty.mark(5);
        dirty.mark(5);
        dirty.mark(2000);
        assert_eq!(dirty.count(), 1);
        assert!(dirty.is_marked(5));
        assert!(!dirty.is_marked(2000));
    }

    #[test]
    fn test_coalesce_runs() {
        let mut dirty = DirtyTracker::new(128, 1024);
        // Marked out of order on purpose
        for idx in [12, 10, 11, 20, 128 + 3, 128 + 4] {
            dirty.mark(idx);
        }

        let plan = dirty.plan();
        assert_eq!(
            plan.ranges(),
            &[
                range(0, 10, 3),
                range(0, 20, 1),
                range(1, 3, 2),
            ]
        );
    }

    #[test]
    fn test_runs_do_not_cross_pages() {
        let mut dirty = DirtyTracker::new(128, 1024);
        dirty.mark(127);
        dirty.mark(128);

        let plan = dirty.plan();
        assert_eq!(plan.ranges().len(), 2);
        assert_eq!(plan.ranges()[0].page, 0);
        assert_eq!(plan.ranges()[1].page, 1);
    }

    #[test]
    fn test_threshold() {
        let total = 1024;
        let limit = total / FULL_UPDATE_RATIO;

        let mut dirty = DirtyTracker::new(128, total);
        for idx in 0..limit {
            dirty.mark(idx * 7);
        }
        assert!(!dirty.plan().is_full());

        dirty.mark(1);
        assert_eq!(dirty.count(), limit + 1);
        assert!(dirty.plan().is_full());
    }

    #[test]
    fn test_plan_keeps_set_drain_clears() {
        let mut dirty = DirtyTracker::new(96, 192);
        dirty.mark(4);

        let _ = dirty.plan();
        assert_eq!(dirty.count(), 1);

        let plan = dirty.drain();
        assert_eq!(plan.ranges().len(), 1);
        assert!(dirty.is_empty());
        assert!(dirty.drain().is_empty());
    }

    #[test]
    fn test_mark_all_goes_full() {
        let mut dirty = DirtyTracker::new(128, 512);
        dirty.mark_all();
        assert_eq!(dirty.count(), 512);
        assert!(dirty.plan().is_full());
    }
}
