//! Indexed allocation
//!
//! One block is picked at random to act as the file's index block, then each
//! data block is picked at random from whatever is still free. Every indexed
//! file always owns exactly one index block in addition to its data blocks.

use crate::allocator::transaction::ClaimTransaction;
use crate::allocator::{insufficient_space, AllocationStrategy, BlockAllocator};
use crate::block::{BlockRole, BlockStore};
use crate::catalog::FileEntry;
use crate::error::Result;
use rand::RngCore;

/// Index block plus randomly placed data blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedAllocator;

impl IndexedAllocator {
    pub fn new() -> Self {
        IndexedAllocator
    }
}

impl BlockAllocator for IndexedAllocator {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::Indexed
    }

    fn allocate(
        &self,
        store: &mut BlockStore,
        name: &str,
        block_count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<FileEntry> {
        let free_before = store.count_free();
        let requested = block_count.saturating_add(1);

        // Data blocks plus the index block must fit in what is free now
        if requested > free_before {
            return Err(insufficient_space(requested, free_before));
        }

        let mut tx = ClaimTransaction::begin(store, name);

        let Some(index_block) = tx.claim_random(BlockRole::Index, rng)? else {
            return Err(insufficient_space(requested, free_before));
        };

        let mut data_blocks = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            match tx.claim_random(BlockRole::Plain, rng)? {
                Some(block) => data_blocks.push(block),
                None => {
                    tx.rollback();
                    return Err(insufficient_space(requested, free_before));
                }
            }
        }

        tx.commit();
        tracing::debug!(
            "Indexed allocation for {}: index {}, data {:?}",
            name,
            index_block,
            data_blocks
        );

        Ok(FileEntry::new(name, data_blocks, self.strategy()).with_index_block(index_block))
    }
}
