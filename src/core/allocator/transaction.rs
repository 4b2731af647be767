//! All-or-nothing block claiming
//!
//! A [`ClaimTransaction`] records every block it claims. Unless it is
//! committed, every claimed block is returned to the free pool, either by
//! an explicit [`ClaimTransaction::rollback`] or when the transaction is
//! dropped on an early return.

use crate::allocator::pick_free_block;
use crate::block::{BlockRole, BlockStore};
use crate::error::{Result, SimError};
use rand::RngCore;

/// Blocks claimed for one file during a single allocation call
pub struct ClaimTransaction<'a> {
    store: &'a mut BlockStore,
    owner: &'a str,
    claimed: Vec<usize>,
    committed: bool,
}

impl<'a> ClaimTransaction<'a> {
    /// Start claiming blocks on behalf of `owner`
    pub fn begin(store: &'a mut BlockStore, owner: &'a str) -> Self {
        ClaimTransaction {
            store,
            owner,
            claimed: Vec::new(),
            committed: false,
        }
    }

    /// Read-only view of the store as it currently stands
    pub fn store(&self) -> &BlockStore {
        self.store
    }

    /// Blocks claimed so far, in claim order
    pub fn claimed(&self) -> &[usize] {
        &self.claimed
    }

    /// Claim a specific free block
    pub fn claim(&mut self, index: usize, role: BlockRole) -> Result<()> {
        if self.store.get(index).is_none() {
            return Err(SimError::InvalidBlockId(index));
        }
        if !self.store.is_free(index) {
            return Err(SimError::BlockAlreadyAllocated(index));
        }

        self.store.mark_owned(index, self.owner, role, None)?;
        self.claimed.push(index);
        Ok(())
    }

    /// Claim one free block chosen uniformly at random
    ///
    /// Returns `None` when no free block remains.
    pub fn claim_random(&mut self, role: BlockRole, rng: &mut dyn RngCore) -> Result<Option<usize>> {
        match pick_free_block(self.store, rng) {
            Some(index) => {
                self.claim(index, role)?;
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    /// Record a display successor on a block claimed by this transaction
    pub fn set_next(&mut self, index: usize, next: Option<usize>) -> Result<()> {
        debug_assert!(self.claimed.contains(&index));
        self.store.set_next(index, next)
    }

    /// Keep every claimed block and hand back the claim list
    pub fn commit(mut self) -> Vec<usize> {
        self.committed = true;
        std::mem::take(&mut self.claimed)
    }

    /// Release every claimed block
    pub fn rollback(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.claimed.is_empty() {
            return;
        }

        tracing::warn!(
            "Rolling back {} block(s) claimed for {}",
            self.claimed.len(),
            self.owner
        );
        for index in self.claimed.drain(..) {
            if let Err(e) = self.store.mark_free(index) {
                tracing::error!("Failed to release block {} for {}: {}", index, self.owner, e);
            }
        }
    }
}

impl Drop for ClaimTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.release();
        }
    }
}
