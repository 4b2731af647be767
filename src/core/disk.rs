//! Disk state: block store, file table and selected strategy
//!
//! `DiskState` owns everything the simulation knows about the disk. It
//! performs the deletion workflow and produces snapshots and statistics for
//! rendering; placing new files is left to the allocation engine.

use crate::allocator::AllocationStrategy;
use crate::block::{Block, BlockStore};
use crate::catalog::{FileEntry, FileTable};
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskState {
    store: BlockStore,
    table: FileTable,
    strategy: AllocationStrategy,
    max_disk_size: usize,
}

impl DiskState {
    /// Create a state with `size` free blocks and an empty table
    pub fn new(size: usize, max_disk_size: usize, strategy: AllocationStrategy) -> Result<Self> {
        Ok(DiskState {
            store: BlockStore::new(size, max_disk_size)?,
            table: FileTable::new(),
            strategy,
            max_disk_size,
        })
    }

    /// Reset to `size` free blocks, clear the table and select `strategy`
    ///
    /// Existing files are discarded. On error nothing changes.
    pub fn initialize(&mut self, size: usize, strategy: AllocationStrategy) -> Result<()> {
        self.store.initialize(size, self.max_disk_size)?;

        if !self.table.is_empty() {
            tracing::info!("Discarding {} file(s) on re-initialization", self.table.len());
        }
        self.table.clear();
        self.strategy = strategy;

        tracing::info!("Initialized disk: {} blocks, {} allocation", size, strategy);
        Ok(())
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut BlockStore {
        &mut self.store
    }

    pub fn table(&self) -> &FileTable {
        &self.table
    }

    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: AllocationStrategy) {
        self.strategy = strategy;
    }

    pub fn max_disk_size(&self) -> usize {
        self.max_disk_size
    }

    /// Record a successful allocation
    pub(crate) fn insert_entry(&mut self, entry: FileEntry) {
        self.table.insert(entry);
    }

    /// Delete a file and free every block it references
    ///
    /// Unknown names return `NotFound` and change nothing.
    pub fn delete_file(&mut self, name: &str) -> Result<FileEntry> {
        let entry = self.table.lookup(name)?;
        let blocks = entry.all_blocks();

        for index in blocks {
            self.store.mark_free(index)?;
        }

        let entry = self.table.remove(name)?;
        tracing::debug!("Deleted {}: freed {} block(s)", name, entry.block_count());
        Ok(entry)
    }

    /// Blocks to highlight when a file is selected: index block first, then data
    pub fn file_blocks(&self, name: &str) -> Result<Vec<usize>> {
        Ok(self.table.lookup(name)?.all_blocks())
    }

    /// Serializable view of the whole disk
    pub fn snapshot(&self) -> DiskSnapshot {
        DiskSnapshot {
            strategy: self.strategy,
            size: self.store.len(),
            blocks: self.store.blocks().to_vec(),
            files: self.table.all().to_vec(),
        }
    }

    pub fn stats(&self) -> DiskStats {
        let free_blocks = self.store.count_free();
        DiskStats {
            total_blocks: self.store.len(),
            free_blocks,
            used_blocks: self.store.len() - free_blocks,
            file_count: self.table.len(),
            largest_free_run: self.store.largest_free_run(),
            fragmentation: self.store.fragmentation_score(),
            strategy: self.strategy,
        }
    }

    /// Check that file descriptors exactly partition the owned blocks
    ///
    /// Every referenced block must be owned by its file with the matching
    /// role, no block may appear in two descriptors, and no owned block may
    /// be left without a descriptor.
    pub fn verify(&self) -> Result<()> {
        let mut referenced: HashMap<usize, &str> = HashMap::new();

        for entry in self.table.all() {
            for index in entry.all_blocks() {
                if let Some(other) = referenced.insert(index, &entry.name) {
                    return Err(SimError::Inconsistent(format!(
                        "block {} referenced by both {} and {}",
                        index, other, entry.name
                    )));
                }

                let block = self.store.get(index).ok_or(SimError::InvalidBlockId(index))?;
                if block.owner() != Some(entry.name.as_str()) {
                    return Err(SimError::Inconsistent(format!(
                        "block {} listed for {} but owned by {:?}",
                        index,
                        entry.name,
                        block.owner()
                    )));
                }

                if block.is_index() != (entry.index_block == Some(index)) {
                    return Err(SimError::Inconsistent(format!(
                        "block {} of {} has the wrong role",
                        index, entry.name
                    )));
                }
            }
        }

        for (index, block) in self.store.blocks().iter().enumerate() {
            if !block.is_free() && !referenced.contains_key(&index) {
                return Err(SimError::Inconsistent(format!(
                    "block {} is owned by {:?} but no file references it",
                    index,
                    block.owner()
                )));
            }
        }

        Ok(())
    }
}

/// Point-in-time copy of the disk for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSnapshot {
    pub strategy: AllocationStrategy,
    pub size: usize,
    pub blocks: Vec<Block>,
    pub files: Vec<FileEntry>,
}

/// Disk usage statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskStats {
    pub total_blocks: usize,
    pub free_blocks: usize,
    pub used_blocks: usize,
    pub file_count: usize,
    /// Largest contiguous request that would currently succeed
    pub largest_free_run: usize,
    pub fragmentation: f64,
    pub strategy: AllocationStrategy,
}
