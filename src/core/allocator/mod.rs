//! Block allocation strategies for the simulated disk
//!
//! Three classical placements are provided:
//! - [`contiguous`] - one run of consecutive blocks, lowest start wins
//! - [`chained`] - scattered blocks picked at random, each with a successor pointer
//! - [`indexed`] - one random index block plus scattered data blocks
//!
//! Every strategy claims blocks through a [`transaction::ClaimTransaction`],
//! so a failed allocation leaves the store exactly as it found it.

pub mod chained;
pub mod contiguous;
pub mod engine;
pub mod indexed;
pub mod transaction;

use crate::block::BlockStore;
use crate::catalog::FileEntry;
use crate::error::{Result, SimError};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placement strategy for new files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStrategy {
    /// One run of consecutive blocks
    #[default]
    #[serde(alias = "contigua")]
    Contiguous,
    /// Linked blocks scattered across the disk
    #[serde(alias = "linked", alias = "encadeada")]
    Chained,
    /// Index block plus scattered data blocks
    #[serde(alias = "indexada")]
    Indexed,
}

impl AllocationStrategy {
    pub const ALL: [AllocationStrategy; 3] = [
        AllocationStrategy::Contiguous,
        AllocationStrategy::Chained,
        AllocationStrategy::Indexed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::Contiguous => "contiguous",
            AllocationStrategy::Chained => "chained",
            AllocationStrategy::Indexed => "indexed",
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationStrategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "contiguous" | "contigua" => Ok(AllocationStrategy::Contiguous),
            "chained" | "linked" | "encadeada" => Ok(AllocationStrategy::Chained),
            "indexed" | "indexada" => Ok(AllocationStrategy::Indexed),
            _ => Err(SimError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Block allocator trait
///
/// Defines how one strategy places a file on the disk.
pub trait BlockAllocator {
    /// Strategy implemented by this allocator
    fn strategy(&self) -> AllocationStrategy;

    /// Claim `block_count` data blocks for `name`
    ///
    /// On success the store is mutated and the new entry is returned; the
    /// caller inserts it into the file table. On failure the store is unchanged.
    fn allocate(
        &self,
        store: &mut BlockStore,
        name: &str,
        block_count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<FileEntry>;
}

/// Pick one free block uniformly at random
///
/// The free list is recomputed on every call, so blocks claimed earlier in
/// the same allocation are never offered again.
pub fn pick_free_block(store: &BlockStore, rng: &mut dyn RngCore) -> Option<usize> {
    store.free_indices().choose(rng).copied()
}

fn insufficient_space(requested: usize, free: usize) -> SimError {
    SimError::InsufficientSpace { requested, free }
}
