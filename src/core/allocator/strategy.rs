//! Placement strategies
//!
//! Each strategy is a pure scan over the block list that picks the index of a
//! free block large enough for a request. Ties favour the lowest address: a
//! candidate only replaces the current pick when it is strictly better.

use super::block::Block;
use crate::error::{AllocError, Result};
use serde::{Deserialize, Serialize};

/// Rule for choosing which free block satisfies a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Lowest-addressed block that fits
    FirstFit,
    /// Smallest block that fits
    BestFit,
    /// Largest block that fits
    WorstFit,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::FirstFit, Strategy::BestFit, Strategy::WorstFit];

    /// Parse the single-character tag used on the command line (`F`, `B`, `W`)
    ///
    /// Tags are case-insensitive.
    pub fn from_tag(tag: char) -> Result<Self> {
        match tag.to_ascii_uppercase() {
            'F' => Ok(Strategy::FirstFit),
            'B' => Ok(Strategy::BestFit),
            'W' => Ok(Strategy::WorstFit),
            _ => Err(AllocError::UnknownStrategy(tag)),
        }
    }

    pub fn tag(self) -> char {
        match self {
            Strategy::FirstFit => 'F',
            Strategy::BestFit => 'B',
            Strategy::WorstFit => 'W',
        }
    }

    /// Index of the block this strategy picks for `size`, if any
    pub fn select(self, blocks: &[Block], size: u64) -> Option<usize> {
        match self {
            Strategy::FirstFit => first_fit(blocks, size),
            Strategy::BestFit => best_fit(blocks, size),
            Strategy::WorstFit => worst_fit(blocks, size),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::FirstFit => "first fit",
            Strategy::BestFit => "best fit",
            Strategy::WorstFit => "worst fit",
        };
        f.write_str(name)
    }
}

/// Free blocks large enough for `size`, with their indices, in address order
fn candidates(blocks: &[Block], size: u64) -> impl Iterator<Item = (usize, u64)> + '_ {
    blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| block.is_free())
        .map(|(idx, block)| (idx, block.size()))
        .filter(move |&(_, block_size)| block_size >= size)
}

fn first_fit(blocks: &[Block], size: u64) -> Option<usize> {
    candidates(blocks, size).next().map(|(idx, _)| idx)
}

fn best_fit(blocks: &[Block], size: u64) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (idx, block_size) in candidates(blocks, size) {
        if best.map_or(true, |(_, best_size)| block_size < best_size) {
            best = Some((idx, block_size));
        }
    }
    best.map(|(idx, _)| idx)
}

fn worst_fit(blocks: &[Block], size: u64) -> Option<usize> {
    let mut worst: Option<(usize, u64)> = None;
    for (idx, block_size) in candidates(blocks, size) {
        if worst.map_or(true, |(_, worst_size)| block_size > worst_size) {
            worst = Some((idx, block_size));
        }
    }
    worst.map(|(idx, _)| idx)
}
