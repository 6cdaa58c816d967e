//! Thread-safe handle to one address space
//!
//! Every operation holds a single mutex for its whole duration, so callers on
//! different threads observe operations one at a time and always see the
//! block list in a valid state.

use super::{Block, ContiguousAllocator, MemoryManager, Strategy};
use crate::error::Result;
use crate::report::{MemoryStats, Report};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, lock-guarded [`ContiguousAllocator`]
///
/// Clones share the same address space.
#[derive(Debug, Clone)]
pub struct SharedAllocator {
    inner: Arc<Mutex<ContiguousAllocator>>,
}

impl SharedAllocator {
    pub fn new(capacity: u64) -> Result<Self> {
        Ok(Self::from_allocator(ContiguousAllocator::new(capacity)?))
    }

    pub fn from_allocator(allocator: ContiguousAllocator) -> Self {
        SharedAllocator {
            inner: Arc::new(Mutex::new(allocator)),
        }
    }

    pub fn allocate(&self, process: &str, size: u64, strategy: Strategy) -> Result<Block> {
        self.inner.lock().allocate(process, size, strategy)
    }

    pub fn allocate_with_tag(&self, process: &str, size: u64, tag: char) -> Result<Block> {
        self.inner.lock().allocate_with_tag(process, size, tag)
    }

    pub fn release(&self, process: &str) -> Result<Block> {
        self.inner.lock().release(process)
    }

    pub fn compact(&self) -> bool {
        self.inner.lock().compact()
    }

    pub fn report(&self) -> Report {
        self.inner.lock().report()
    }

    pub fn stats(&self) -> MemoryStats {
        self.inner.lock().stats()
    }

    /// Run `f` with exclusive access, for multi-step sequences that must not interleave
    pub fn with<R>(&self, f: impl FnOnce(&mut ContiguousAllocator) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }
}

impl MemoryManager for SharedAllocator {
    fn allocate(&mut self, process: &str, size: u64, strategy: Strategy) -> Result<Block> {
        SharedAllocator::allocate(self, process, size, strategy)
    }

    fn allocate_with_tag(&mut self, process: &str, size: u64, tag: char) -> Result<Block> {
        SharedAllocator::allocate_with_tag(self, process, size, tag)
    }

    fn release(&mut self, process: &str) -> Result<Block> {
        SharedAllocator::release(self, process)
    }

    fn compact(&mut self) -> bool {
        SharedAllocator::compact(self)
    }

    fn report(&self) -> Report {
        SharedAllocator::report(self)
    }
}
