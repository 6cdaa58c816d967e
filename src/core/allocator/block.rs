//! Address-range records for the block list
//!
//! A block is one maximal contiguous range of addresses in a single state:
//! free, or owned by exactly one process. Addresses are inclusive on both ends.

use crate::validation::ProcessId;
use serde::{Deserialize, Serialize};

/// A contiguous range of addresses `[start, end]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// First address in the range
    pub start: u64,
    /// Last address in the range (inclusive)
    pub end: u64,
    /// Owning process, `None` for a free block
    pub owner: Option<ProcessId>,
}

impl Block {
    /// Create a free block covering `[start, end]`
    pub fn free(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "block [{start}:{end}] is empty");
        Block {
            start,
            end,
            owner: None,
        }
    }

    /// Create a block covering `[start, end]` owned by `owner`
    pub fn owned(start: u64, end: u64, owner: ProcessId) -> Self {
        debug_assert!(start <= end, "block [{start}:{end}] is empty");
        Block {
            start,
            end,
            owner: Some(owner),
        }
    }

    /// Number of addresses covered, always at least 1
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    /// Check whether this block is owned by `id`
    pub fn is_owned_by(&self, id: &str) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.as_str() == id)
    }

    /// Check if `other` starts right after this block ends
    pub fn is_followed_by(&self, other: &Block) -> bool {
        self.end.checked_add(1) == Some(other.start)
    }

    /// Split off the first `size` addresses for `owner`
    ///
    /// Returns the owned prefix and, when `size` is smaller than the block,
    /// the free remainder. The caller guarantees `1 <= size <= self.size()`.
    pub fn split(&self, size: u64, owner: ProcessId) -> (Block, Option<Block>) {
        debug_assert!(size >= 1 && size <= self.size());

        let prefix_end = self.start + size - 1;
        let prefix = Block::owned(self.start, prefix_end, owner);

        let remainder = (prefix_end < self.end).then(|| Block::free(prefix_end + 1, self.end));

        (prefix, remainder)
    }

    /// Same size and owner, moved so it begins at `start`
    pub fn relocated(&self, start: u64) -> Block {
        Block {
            start,
            end: start + self.size() - 1,
            owner: self.owner.clone(),
        }
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "Addresses [{}:{}] Process {}", self.start, self.end, owner),
            None => write!(f, "Addresses [{}:{}] Unused", self.start, self.end),
        }
    }
}
