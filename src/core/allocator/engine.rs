//! Allocation engine that dispatches to the selected strategy
//!
//! The engine owns the random source used by the chained and indexed
//! strategies. Seeding it makes every placement reproducible.

use crate::allocator::chained::ChainedAllocator;
use crate::allocator::contiguous::ContiguousAllocator;
use crate::allocator::indexed::IndexedAllocator;
use crate::allocator::{AllocationStrategy, BlockAllocator};
use crate::block::BlockStore;
use crate::catalog::FileEntry;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;

/// Places files on a [`BlockStore`] using an injected random source
pub struct AllocationEngine {
    rng: Box<dyn RngCore>,
    seed: Option<u64>,
}

impl AllocationEngine {
    /// Create an engine around any random source (e.g. a mock in tests)
    pub fn new(rng: impl RngCore + 'static) -> Self {
        AllocationEngine {
            rng: Box::new(rng),
            seed: None,
        }
    }

    /// Create a reproducible engine
    pub fn seeded(seed: u64) -> Self {
        AllocationEngine {
            rng: Box::new(StdRng::seed_from_u64(seed)),
            seed: Some(seed),
        }
    }

    /// Create an engine seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Seed this engine was built from, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Allocator implementing `strategy`
    pub fn allocator_for(strategy: AllocationStrategy) -> &'static dyn BlockAllocator {
        match strategy {
            AllocationStrategy::Contiguous => &ContiguousAllocator,
            AllocationStrategy::Chained => &ChainedAllocator,
            AllocationStrategy::Indexed => &IndexedAllocator,
        }
    }

    /// Claim `block_count` data blocks for `name` under `strategy`
    ///
    /// On failure the store is left exactly as it was.
    pub fn allocate(
        &mut self,
        store: &mut BlockStore,
        name: &str,
        block_count: usize,
        strategy: AllocationStrategy,
    ) -> Result<FileEntry> {
        Self::allocator_for(strategy).allocate(store, name, block_count, &mut *self.rng)
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl fmt::Debug for AllocationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationEngine")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
