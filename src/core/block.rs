//! Simulated disk blocks
//!
//! The [`BlockStore`] is the ground truth of disk state: a fixed-length
//! sequence of blocks, each either free or owned by exactly one file.
//! It only offers direct mutators; keeping the owner/descriptor partition
//! consistent is the job of the allocation engine and the deletion workflow.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Default number of blocks for a fresh disk
pub const DEFAULT_DISK_SIZE: usize = 20;

/// Largest disk the simulator accepts (keeps the block grid renderable)
pub const MAX_DISK_SIZE: usize = 256;

/// What an owned block is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRole {
    /// Holds file content
    Plain,
    /// Pointer block of an indexed file
    Index,
}

/// One unit of disk capacity
///
/// A block is either fully free or fully owned; there is no state in
/// between, so an owner, role or successor can never linger on a free block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Block {
    Free,
    Owned {
        /// Name of the owning file
        owner: String,
        role: BlockRole,
        /// Successor recorded by the chained strategy
        ///
        /// Stored for display only. It is drawn independently of the next
        /// claimed block and does not form a traversable chain; the owning
        /// file's `data_blocks` order is authoritative.
        next: Option<usize>,
    },
}

impl Block {
    pub fn is_free(&self) -> bool {
        matches!(self, Block::Free)
    }

    /// Owning file, if any
    pub fn owner(&self) -> Option<&str> {
        match self {
            Block::Free => None,
            Block::Owned { owner, .. } => Some(owner),
        }
    }

    pub fn role(&self) -> Option<BlockRole> {
        match self {
            Block::Free => None,
            Block::Owned { role, .. } => Some(*role),
        }
    }

    pub fn next(&self) -> Option<usize> {
        match self {
            Block::Free => None,
            Block::Owned { next, .. } => *next,
        }
    }

    pub fn is_index(&self) -> bool {
        self.role() == Some(BlockRole::Index)
    }
}

/// A maximal run of consecutive free blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeRun {
    /// First block of the run
    pub start: usize,
    /// Number of consecutive free blocks
    pub length: usize,
}

impl FreeRun {
    pub fn new(start: usize, length: usize) -> Self {
        FreeRun { start, length }
    }

    /// Check if this run contains a block index
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.start + self.length
    }
}

/// Fixed-size array of blocks representing the virtual disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStore {
    blocks: Vec<Block>,
}

impl BlockStore {
    /// Create a store of `size` free blocks
    ///
    /// # Errors
    ///
    /// Returns `InvalidSize` if `size` is zero or exceeds `max_size`.
    pub fn new(size: usize, max_size: usize) -> Result<Self> {
        if size == 0 || size > max_size {
            return Err(SimError::InvalidSize {
                size,
                max: max_size,
            });
        }

        Ok(BlockStore {
            blocks: vec![Block::Free; size],
        })
    }

    /// Replace the store contents with `size` free blocks
    ///
    /// On error the current contents are kept.
    pub fn initialize(&mut self, size: usize, max_size: usize) -> Result<()> {
        *self = BlockStore::new(size, max_size)?;
        Ok(())
    }

    /// Total number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Check if a block is free (out-of-range indices are never free)
    pub fn is_free(&self, index: usize) -> bool {
        self.blocks.get(index).map_or(false, Block::is_free)
    }

    /// Mark a block as owned by `owner`
    pub fn mark_owned(
        &mut self,
        index: usize,
        owner: &str,
        role: BlockRole,
        next: Option<usize>,
    ) -> Result<()> {
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(SimError::InvalidBlockId(index))?;

        *block = Block::Owned {
            owner: owner.to_string(),
            role,
            next,
        };
        Ok(())
    }

    /// Record the display successor of an owned block
    pub fn set_next(&mut self, index: usize, successor: Option<usize>) -> Result<()> {
        match self.blocks.get_mut(index) {
            Some(Block::Owned { next, .. }) => {
                *next = successor;
                Ok(())
            }
            _ => Err(SimError::InvalidBlockId(index)),
        }
    }

    /// Return a block to the free pool
    pub fn mark_free(&mut self, index: usize) -> Result<()> {
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(SimError::InvalidBlockId(index))?;

        if block.is_free() {
            tracing::warn!("Double-free detected for block {}", index);
        }

        *block = Block::Free;
        Ok(())
    }

    /// Number of free blocks
    pub fn count_free(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_free()).count()
    }

    /// Indices of free blocks, ascending
    pub fn free_indices(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_free())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of blocks owned by `name`, ascending
    pub fn owned_by(&self, name: &str) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.owner() == Some(name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Maximal runs of consecutive free blocks, in disk order
    pub fn free_runs(&self) -> Vec<FreeRun> {
        let mut runs = Vec::new();
        let mut start = None;

        for (i, block) in self.blocks.iter().enumerate() {
            match (block.is_free(), start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    runs.push(FreeRun::new(s, i - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push(FreeRun::new(s, self.blocks.len() - s));
        }

        runs
    }

    /// Length of the longest free run (largest contiguous request that fits)
    pub fn largest_free_run(&self) -> usize {
        self.free_runs().iter().map(|r| r.length).max().unwrap_or(0)
    }

    /// Fragmentation score (0.0 = none, higher = more scattered)
    ///
    /// Counts free/owned transitions along the disk, normalized by size.
    pub fn fragmentation_score(&self) -> f64 {
        if self.blocks.is_empty() {
            return 0.0;
        }

        let transitions = self
            .blocks
            .windows(2)
            .filter(|pair| pair[0].is_free() != pair[1].is_free())
            .count();

        (transitions as f64) / (self.blocks.len() as f64)
    }
}
