//! # contigalloc - Contiguous Memory Allocation Simulator
//!
//! `contigalloc` models one fixed-size, contiguous address space shared by
//! named processes. It tracks which ranges are owned and which are free,
//! without touching real memory:
//!
//! - **Three placement strategies**: first fit, best fit, worst fit
//! - **Coalescing**: neighbouring free blocks merge on every release
//! - **Compaction**: owned blocks slide to address 0, free space collapses
//!   into one trailing block
//! - **Text front end**: `RQ` / `RL` / `C` / `STAT` / `X` command dispatcher
//!
//! ## Quick Start
//!
//! ```rust
//! use contigalloc::{ContiguousAllocator, Result, Strategy};
//!
//! # fn main() -> Result<()> {
//! let mut memory = ContiguousAllocator::new(1024)?;
//!
//! memory.allocate("P1", 300, Strategy::FirstFit)?;
//! memory.allocate("P2", 200, Strategy::BestFit)?;
//! memory.release("P1")?;
//! memory.compact();
//!
//! for line in memory.report().lines() {
//!     println!("{}", line);
//! }
//! // Addresses [0:199] Process P2
//! // Addresses [200:1023] Unused
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ bin/allocator  (clap, tracing-subscriber)    │
//! ├──────────────────────────────────────────────┤
//! │ command::Dispatcher  (parse, format)         │
//! ├──────────────────────────────────────────────┤
//! │ MemoryManager                                │
//! │  ├─ ContiguousAllocator   single caller      │
//! │  └─ SharedAllocator       Arc<Mutex<..>>     │
//! ├──────────────────────────────────────────────┤
//! │ Block list: [0:cap-1], sorted, no gaps       │
//! │  Strategy::{FirstFit, BestFit, WorstFit}     │
//! └──────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use crate::core::{allocator, config, error, report, validation};

pub use crate::core::{
    allocator::{Block, ContiguousAllocator, MemoryManager, SharedAllocator, Strategy},
    config::AllocatorConfig,
    error::{AllocError, Result},
    report::{MemoryStats, Report},
    validation::ProcessId,
};
pub use command::{Command, Dispatcher, Outcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
