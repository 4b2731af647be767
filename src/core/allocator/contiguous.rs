//! Contiguous allocation
//!
//! A file occupies one run of consecutive blocks. Starts are scanned in
//! ascending order and the first fitting run wins (first fit), so placement
//! is fully deterministic.

use crate::allocator::transaction::ClaimTransaction;
use crate::allocator::{insufficient_space, AllocationStrategy, BlockAllocator};
use crate::block::{BlockRole, BlockStore};
use crate::catalog::FileEntry;
use crate::error::Result;
use rand::RngCore;

/// First-fit allocator for consecutive runs
#[derive(Debug, Clone, Copy, Default)]
pub struct ContiguousAllocator;

impl ContiguousAllocator {
    pub fn new() -> Self {
        ContiguousAllocator
    }

    /// Find the lowest start index of `block_count` consecutive free blocks
    pub fn find_run(store: &BlockStore, block_count: usize) -> Option<usize> {
        if block_count == 0 || block_count > store.len() {
            return None;
        }

        (0..=store.len() - block_count)
            .find(|&start| (start..start + block_count).all(|i| store.is_free(i)))
    }
}

impl BlockAllocator for ContiguousAllocator {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::Contiguous
    }

    fn allocate(
        &self,
        store: &mut BlockStore,
        name: &str,
        block_count: usize,
        _rng: &mut dyn RngCore,
    ) -> Result<FileEntry> {
        let start = Self::find_run(store, block_count)
            .ok_or_else(|| insufficient_space(block_count, store.count_free()))?;

        let mut tx = ClaimTransaction::begin(store, name);
        for index in start..start + block_count {
            tx.claim(index, BlockRole::Plain)?;
        }
        let blocks = tx.commit();

        tracing::debug!(
            "Contiguous allocation for {}: blocks {}..{}",
            name,
            start,
            start + block_count
        );

        Ok(FileEntry::new(name, blocks, self.strategy()))
    }
}
