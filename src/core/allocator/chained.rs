//! Chained (linked) allocation
//!
//! Each block is picked uniformly at random from the free blocks that remain
//! at that moment, which scatters the file across the disk and makes
//! fragmentation visible.
//!
//! Every block but the last records a `next` pointer. That pointer is an
//! independent random draw taken after the block is claimed, so it usually
//! differs from the block claimed in the following step: the pointers do not
//! form a traversable chain. Traversal order lives in `data_blocks`.

use crate::allocator::transaction::ClaimTransaction;
use crate::allocator::{insufficient_space, pick_free_block, AllocationStrategy, BlockAllocator};
use crate::block::{BlockRole, BlockStore};
use crate::catalog::FileEntry;
use crate::error::Result;
use rand::RngCore;

/// Random-placement allocator with per-block successor pointers
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainedAllocator;

impl ChainedAllocator {
    pub fn new() -> Self {
        ChainedAllocator
    }
}

impl BlockAllocator for ChainedAllocator {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::Chained
    }

    fn allocate(
        &self,
        store: &mut BlockStore,
        name: &str,
        block_count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<FileEntry> {
        let free_before = store.count_free();
        let mut tx = ClaimTransaction::begin(store, name);

        for i in 0..block_count {
            let Some(block) = tx.claim_random(BlockRole::Plain, rng)? else {
                tx.rollback();
                return Err(insufficient_space(block_count, free_before));
            };

            if i + 1 < block_count {
                let next = pick_free_block(tx.store(), rng);
                tx.set_next(block, next)?;
            }
        }

        let blocks = tx.commit();
        tracing::debug!("Chained allocation for {}: blocks {:?}", name, blocks);

        Ok(FileEntry::new(name, blocks, self.strategy()))
    }
}
