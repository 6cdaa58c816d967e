//! Read-only snapshots of an address space

use crate::allocator::Block;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Ordered copy of the block list at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub capacity: u64,
    pub blocks: Vec<Block>,
}

impl Report {
    pub fn new(capacity: u64, blocks: Vec<Block>) -> Self {
        Report { capacity, blocks }
    }

    /// One status line per block, lowest address first
    ///
    /// ```text
    /// Addresses [0:299] Process P1
    /// Addresses [300:1023] Unused
    /// ```
    pub fn lines(&self) -> Vec<String> {
        self.blocks.iter().map(Block::to_string).collect()
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats::from_blocks(self.capacity, &self.blocks)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for block in &self.blocks {
            writeln!(f, "{}", block)?;
        }
        Ok(())
    }
}

/// Totals derived from the block list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub capacity: u64,
    pub used: u64,
    pub free: u64,
    pub owned_blocks: usize,
    pub free_blocks: usize,
    pub largest_free: u64,
}

impl MemoryStats {
    pub fn from_blocks(capacity: u64, blocks: &[Block]) -> Self {
        let mut stats = MemoryStats {
            capacity,
            used: 0,
            free: 0,
            owned_blocks: 0,
            free_blocks: 0,
            largest_free: 0,
        };

        for block in blocks {
            if block.is_free() {
                stats.free += block.size();
                stats.free_blocks += 1;
                stats.largest_free = stats.largest_free.max(block.size());
            } else {
                stats.used += block.size();
                stats.owned_blocks += 1;
            }
        }

        stats
    }
}
