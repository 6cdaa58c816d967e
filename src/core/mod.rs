//! Core address-space model
//!
//! - [`allocator`] - block list, placement strategies, coalescing, compaction
//! - [`report`] - snapshots and totals for display
//! - [`validation`] - process identifiers
//! - [`config`] - TOML configuration
//! - [`error`] - error taxonomy

pub mod allocator;
pub mod config;
pub mod error;
pub mod report;
pub mod validation;

pub use allocator::{Block, ContiguousAllocator, MemoryManager, SharedAllocator, Strategy};
pub use error::{AllocError, Result};
