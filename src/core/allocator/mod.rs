//! Block-list allocator for a single contiguous address space
//!
//! The address space is an ordered list of [`Block`]s that always covers
//! `[0, capacity-1]` exactly once:
//! - sorted by ascending start address, no gaps, no overlaps
//! - no two neighbouring free blocks after a release or compaction
//! - at most one block per process
//!
//! Placement is delegated to a [`Strategy`]; splitting, coalescing and
//! compaction live here because they are the only code that mutates the list.

pub mod block;
pub mod shared;
pub mod strategy;

pub use block::Block;
pub use shared::SharedAllocator;
pub use strategy::Strategy;

use crate::error::{AllocError, Result};
use crate::report::{MemoryStats, Report};
use crate::validation::ProcessId;
use tracing::{debug, info};

/// Operations a front end needs from an address space
///
/// Implemented by [`ContiguousAllocator`] for single-caller use and by
/// [`SharedAllocator`] when several handles drive the same space.
pub trait MemoryManager {
    /// Place `size` addresses for `process` using `strategy`
    fn allocate(&mut self, process: &str, size: u64, strategy: Strategy) -> Result<Block>;

    /// Same as [`MemoryManager::allocate`], with the strategy given as its
    /// one-letter tag
    fn allocate_with_tag(&mut self, process: &str, size: u64, tag: char) -> Result<Block>;

    /// Free the block owned by `process`
    fn release(&mut self, process: &str) -> Result<Block>;

    /// Pack owned blocks to the bottom of the space; returns whether anything moved
    fn compact(&mut self) -> bool;

    /// Snapshot of the block list
    fn report(&self) -> Report;
}

/// Contiguous allocator over a fixed-capacity address space
#[derive(Debug, Clone)]
pub struct ContiguousAllocator {
    capacity: u64,
    blocks: Vec<Block>,
}

impl ContiguousAllocator {
    /// Create an allocator whose whole range starts out as one free block
    pub fn new(capacity: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(AllocError::InvalidCapacity(capacity));
        }

        info!("Creating address space with capacity {}", capacity);

        Ok(ContiguousAllocator {
            capacity,
            blocks: vec![Block::free(0, capacity - 1)],
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Read-only view of the block list in address order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Block owned by `process`, if any
    pub fn owner_block(&self, process: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.is_owned_by(process))
    }

    pub fn contains(&self, process: &str) -> bool {
        self.owner_block(process).is_some()
    }

    /// Total number of free addresses, fragmented or not
    pub fn free_size(&self) -> u64 {
        self.blocks
            .iter()
            .filter(|block| block.is_free())
            .map(Block::size)
            .sum()
    }

    pub fn used_size(&self) -> u64 {
        self.capacity - self.free_size()
    }

    /// Size of the largest free block (0 when the space is full)
    pub fn largest_free(&self) -> u64 {
        self.blocks
            .iter()
            .filter(|block| block.is_free())
            .map(Block::size)
            .max()
            .unwrap_or(0)
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats::from_blocks(self.capacity, &self.blocks)
    }

    /// Allocate `size` addresses for `process`
    ///
    /// The chosen free block is split into an owned prefix and a free
    /// remainder, or taken whole when it fits exactly.
    ///
    /// # Errors
    ///
    /// Checked in order: `InvalidProcessId`, `InvalidSize`, `DuplicateProcess`,
    /// `InsufficientMemory`. The block list is unchanged on failure.
    pub fn allocate(&mut self, process: &str, size: u64, strategy: Strategy) -> Result<Block> {
        let owner = self.check_request(process, size)?;
        self.place(owner, size, strategy)
    }

    /// Allocate with the strategy given as a one-letter tag (`F`, `B`, `W`)
    ///
    /// The tag is parsed after the duplicate check, so a request from a
    /// process that already owns memory reports `DuplicateProcess` even when
    /// the tag is also bad.
    pub fn allocate_with_tag(&mut self, process: &str, size: u64, tag: char) -> Result<Block> {
        let owner = self.check_request(process, size)?;
        let strategy = Strategy::from_tag(tag)?;
        self.place(owner, size, strategy)
    }

    fn check_request(&self, process: &str, size: u64) -> Result<ProcessId> {
        let owner = ProcessId::new(process)?;

        if size == 0 {
            return Err(AllocError::InvalidSize(size));
        }

        if self.contains(process) {
            debug!("Rejecting request from {}: already owns memory", owner);
            return Err(AllocError::DuplicateProcess(owner));
        }

        Ok(owner)
    }

    fn place(&mut self, owner: ProcessId, size: u64, strategy: Strategy) -> Result<Block> {
        let Some(idx) = strategy.select(&self.blocks, size) else {
            let largest_free = self.largest_free();
            debug!(
                "No free block for {} ({} requested, {} largest, {})",
                owner, size, largest_free, strategy
            );
            return Err(AllocError::InsufficientMemory {
                requested: size,
                largest_free,
            });
        };

        let (placed, remainder) = self.blocks[idx].split(size, owner);
        let replacement: Vec<Block> = std::iter::once(placed.clone()).chain(remainder).collect();
        self.blocks.splice(idx..=idx, replacement);

        debug!(
            "Placed [{}:{}] for {} using {}",
            placed.start,
            placed.end,
            placed.owner.as_ref().map_or("", ProcessId::as_str),
            strategy
        );
        debug_assert!(self.validate_layout().is_ok());

        Ok(placed)
    }

    /// Free the block owned by `process` and merge it with free neighbours
    ///
    /// Returns the freed range as it was before merging.
    ///
    /// # Errors
    ///
    /// `ProcessNotFound` if `process` owns no block.
    pub fn release(&mut self, process: &str) -> Result<Block> {
        let idx = self
            .blocks
            .iter()
            .position(|block| block.is_owned_by(process))
            .ok_or_else(|| {
                debug!("Release for {} found nothing", process);
                AllocError::ProcessNotFound(process.to_string())
            })?;

        let released = self.blocks[idx].clone();
        self.blocks[idx].owner = None;
        let merged = self.coalesce();

        debug!(
            "Released [{}:{}] from {} ({} merges)",
            released.start, released.end, process, merged
        );
        debug_assert!(self.validate().is_ok());

        Ok(released)
    }

    /// Merge every run of neighbouring free blocks into one; returns the merge count
    fn coalesce(&mut self) -> usize {
        let mut merges = 0;
        let mut i = 0;

        while i + 1 < self.blocks.len() {
            if self.blocks[i].is_free() && self.blocks[i + 1].is_free() {
                self.blocks[i].end = self.blocks[i + 1].end;
                self.blocks.remove(i + 1);
                merges += 1;
                // Stay on i: the widened block may now touch another free one
            } else {
                i += 1;
            }
        }

        merges
    }

    /// Move every owned block to the bottom of the space
    ///
    /// Owned blocks keep their relative order, size and owner. All free space
    /// becomes a single block at the top. Does nothing (and returns `false`)
    /// when there is at most one block, no free space, or nothing owned.
    pub fn compact(&mut self) -> bool {
        if self.blocks.len() <= 1 {
            return false;
        }

        let free_total = self.free_size();
        let owned_count = self.blocks.iter().filter(|block| !block.is_free()).count();

        if free_total == 0 || owned_count == 0 {
            return false;
        }

        let mut next = 0u64;
        let mut rebuilt = Vec::with_capacity(owned_count + 1);
        for block in self.blocks.iter().filter(|block| !block.is_free()) {
            let moved = block.relocated(next);
            next = moved.end + 1;
            rebuilt.push(moved);
        }

        if next < self.capacity {
            rebuilt.push(Block::free(next, self.capacity - 1));
        }

        let changed = rebuilt != self.blocks;
        self.blocks = rebuilt;

        debug!(
            "Compacted {} owned blocks, {} free at [{}:{}]",
            owned_count,
            free_total,
            next,
            self.capacity - 1
        );
        debug_assert!(self.validate().is_ok());

        changed
    }

    /// Snapshot of the current block list for display
    pub fn report(&self) -> Report {
        Report::new(self.capacity, self.blocks.clone())
    }

    /// Check every address-space invariant, including maximal free blocks
    ///
    /// Holds after construction, release and compaction.
    pub fn validate(&self) -> Result<()> {
        self.validate_layout()?;

        for pair in self.blocks.windows(2) {
            if pair[0].is_free() && pair[1].is_free() {
                return Err(AllocError::Corrupted(format!(
                    "neighbouring free blocks [{}:{}] and [{}:{}]",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }

        Ok(())
    }

    /// Check order, coverage, block sizes and owner uniqueness
    ///
    /// Holds after every public operation.
    pub fn validate_layout(&self) -> Result<()> {
        let first = self
            .blocks
            .first()
            .ok_or_else(|| AllocError::Corrupted("block list is empty".to_string()))?;
        if first.start != 0 {
            return Err(AllocError::Corrupted(format!(
                "first block starts at {}",
                first.start
            )));
        }

        for block in &self.blocks {
            if block.start > block.end {
                return Err(AllocError::Corrupted(format!(
                    "block [{}:{}] is empty",
                    block.start, block.end
                )));
            }
        }

        for pair in self.blocks.windows(2) {
            if !pair[0].is_followed_by(&pair[1]) {
                return Err(AllocError::Corrupted(format!(
                    "gap or overlap between [{}:{}] and [{}:{}]",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }

        let last = &self.blocks[self.blocks.len() - 1];
        if last.end != self.capacity - 1 {
            return Err(AllocError::Corrupted(format!(
                "last block ends at {}, capacity is {}",
                last.end, self.capacity
            )));
        }

        let mut owners: Vec<&ProcessId> =
            self.blocks.iter().filter_map(|block| block.owner.as_ref()).collect();
        owners.sort();
        if let Some(dup) = owners.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(AllocError::Corrupted(format!(
                "process {} owns more than one block",
                dup[0]
            )));
        }

        Ok(())
    }
}

impl MemoryManager for ContiguousAllocator {
    fn allocate(&mut self, process: &str, size: u64, strategy: Strategy) -> Result<Block> {
        ContiguousAllocator::allocate(self, process, size, strategy)
    }

    fn allocate_with_tag(&mut self, process: &str, size: u64, tag: char) -> Result<Block> {
        ContiguousAllocator::allocate_with_tag(self, process, size, tag)
    }

    fn release(&mut self, process: &str) -> Result<Block> {
        ContiguousAllocator::release(self, process)
    }

    fn compact(&mut self) -> bool {
        ContiguousAllocator::compact(self)
    }

    fn report(&self) -> Report {
        ContiguousAllocator::report(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(alloc: &ContiguousAllocator) -> Vec<(u64, u64, Option<&str>)> {
        alloc
            .blocks()
            .iter()
            .map(|b| (b.start, b.end, b.owner.as_ref().map(ProcessId::as_str)))
            .collect()
    }

    #[test]
    fn test_allocator_creation() {
        let alloc = ContiguousAllocator::new(1024).unwrap();
        assert_eq!(alloc.capacity(), 1024);
        assert_eq!(alloc.free_size(), 1024);
        assert_eq!(alloc.block_count(), 1);
        assert_eq!(layout(&alloc), vec![(0, 1023, None)]);
        alloc.validate().unwrap();
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            ContiguousAllocator::new(0),
            Err(AllocError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_allocate_splits_block() {
        let mut alloc = ContiguousAllocator::new(1024).unwrap();
        let placed = alloc.allocate("P1", 300, Strategy::FirstFit).unwrap();

        assert_eq!((placed.start, placed.end), (0, 299));
        assert_eq!(layout(&alloc), vec![(0, 299, Some("P1")), (300, 1023, None)]);
        assert_eq!(alloc.used_size(), 300);
    }

    #[test]
    fn test_allocate_exact_fit_takes_block_whole() {
        let mut alloc = ContiguousAllocator::new(100).unwrap();
        alloc.allocate("P1", 100, Strategy::BestFit).unwrap();

        assert_eq!(layout(&alloc), vec![(0, 99, Some("P1"))]);
        assert_eq!(alloc.free_size(), 0);
        assert_eq!(alloc.largest_free(), 0);
        alloc.validate().unwrap();
    }

    #[test]
    fn test_allocate_rejects_bad_arguments() {
        let mut alloc = ContiguousAllocator::new(1024).unwrap();

        assert!(matches!(
            alloc.allocate("", 10, Strategy::FirstFit),
            Err(AllocError::InvalidProcessId(_))
        ));
        assert!(matches!(
            alloc.allocate("P1", 0, Strategy::FirstFit),
            Err(AllocError::InvalidSize(0))
        ));
        assert_eq!(alloc.block_count(), 1);
    }

    #[test]
    fn test_long_process_id_allocates() {
        let mut alloc = ContiguousAllocator::new(1024).unwrap();
        let long_id = "p".repeat(65);

        let placed = alloc.allocate(&long_id, 10, Strategy::FirstFit).unwrap();
        assert!(placed.is_owned_by(&long_id));

        alloc.release(&long_id).unwrap();
        assert_eq!(layout(&alloc), vec![(0, 1023, None)]);
    }

    #[test]
    fn test_duplicate_checked_before_strategy() {
        let mut alloc = ContiguousAllocator::new(1024).unwrap();
        alloc.allocate("P1", 10, Strategy::FirstFit).unwrap();

        assert!(matches!(
            alloc.allocate_with_tag("P1", 10, 'Q'),
            Err(AllocError::DuplicateProcess(_))
        ));
        assert!(matches!(
            alloc.allocate_with_tag("P2", 10, 'Q'),
            Err(AllocError::UnknownStrategy('Q'))
        ));
        assert!(matches!(
            alloc.allocate_with_tag("P2", 5000, 'Q'),
            Err(AllocError::UnknownStrategy('Q'))
        ));
        assert!(!alloc.contains("P2"));
    }

    #[test]
    fn test_insufficient_memory_reports_largest_free() {
        let mut alloc = ContiguousAllocator::new(1024).unwrap();
        alloc.allocate("P1", 1000, Strategy::FirstFit).unwrap();

        let err = alloc.allocate("P2", 25, Strategy::WorstFit).unwrap_err();
        assert!(matches!(
            err,
            AllocError::InsufficientMemory {
                requested: 25,
                largest_free: 24
            }
        ));
    }

    #[test]
    fn test_release_and_coalesce() {
        let mut alloc = ContiguousAllocator::new(1000).unwrap();
        alloc.allocate("A", 100, Strategy::FirstFit).unwrap(); // 0-99
        alloc.allocate("B", 100, Strategy::FirstFit).unwrap(); // 100-199
        alloc.allocate("C", 100, Strategy::FirstFit).unwrap(); // 200-299

        // Free middle block: no free neighbours
        alloc.release("B").unwrap();
        assert_eq!(alloc.block_count(), 5);

        // Free first block: merges with the hole left by B
        alloc.release("A").unwrap();
        assert_eq!(
            layout(&alloc),
            vec![(0, 199, None), (200, 299, Some("C")), (300, 999, None)]
        );

        // Free last owned block: merges both sides into one
        let freed = alloc.release("C").unwrap();
        assert_eq!((freed.start, freed.end), (200, 299));
        assert_eq!(layout(&alloc), vec![(0, 999, None)]);
        alloc.validate().unwrap();
    }

    #[test]
    fn test_release_unknown_process() {
        let mut alloc = ContiguousAllocator::new(1024).unwrap();
        assert!(matches!(
            alloc.release("ghost"),
            Err(AllocError::ProcessNotFound(p)) if p == "ghost"
        ));
    }

    #[test]
    fn test_released_process_can_allocate_again() {
        let mut alloc = ContiguousAllocator::new(1024).unwrap();
        alloc.allocate("P1", 100, Strategy::FirstFit).unwrap();
        alloc.release("P1").unwrap();
        alloc.allocate("P1", 200, Strategy::FirstFit).unwrap();
        assert_eq!(alloc.owner_block("P1").unwrap().size(), 200);
    }

    #[test]
    fn test_compact_preserves_order() {
        let mut alloc = ContiguousAllocator::new(1000).unwrap();
        alloc.allocate("A", 100, Strategy::FirstFit).unwrap(); // 0-99
        alloc.allocate("B", 50, Strategy::FirstFit).unwrap(); // 100-149
        alloc.allocate("C", 200, Strategy::FirstFit).unwrap(); // 150-349
        alloc.allocate("D", 10, Strategy::FirstFit).unwrap(); // 350-359
        alloc.release("A").unwrap();
        alloc.release("C").unwrap();

        assert!(alloc.compact());
        assert_eq!(
            layout(&alloc),
            vec![(0, 49, Some("B")), (50, 59, Some("D")), (60, 999, None)]
        );
        alloc.validate().unwrap();

        // Second pass changes nothing
        let before = alloc.blocks().to_vec();
        assert!(!alloc.compact());
        assert_eq!(alloc.blocks(), before.as_slice());
    }

    #[test]
    fn test_compact_noops() {
        // Single block
        let mut alloc = ContiguousAllocator::new(64).unwrap();
        assert!(!alloc.compact());

        // No free space
        alloc.allocate("A", 32, Strategy::FirstFit).unwrap();
        alloc.allocate("B", 32, Strategy::FirstFit).unwrap();
        let before = alloc.blocks().to_vec();
        assert!(!alloc.compact());
        assert_eq!(alloc.blocks(), before.as_slice());
    }

    #[test]
    fn test_validate_detects_corruption() {
        let mut alloc = ContiguousAllocator::new(100).unwrap();
        alloc.blocks = vec![Block::free(0, 49), Block::free(51, 99)];
        assert!(matches!(alloc.validate(), Err(AllocError::Corrupted(_))));

        alloc.blocks = vec![Block::free(0, 49), Block::free(50, 99)];
        assert!(alloc.validate_layout().is_ok());
        assert!(alloc.validate().is_err());

        let p = ProcessId::new("P").unwrap();
        alloc.blocks = vec![
            Block::owned(0, 49, p.clone()),
            Block::owned(50, 99, p),
        ];
        assert!(alloc.validate_layout().is_err());
    }
}
