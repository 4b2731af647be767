//! File allocation table
//!
//! Maps file names to the blocks they occupy. Entries keep insertion order
//! so the allocation table renders files in the order they were created.

use crate::allocator::AllocationStrategy;
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Allocation descriptor for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name (unique within the table)
    pub name: String,

    /// Blocks holding the file's content
    ///
    /// Logical order for contiguous and indexed files, allocation order
    /// for chained files.
    pub data_blocks: Vec<usize>,

    /// Pointer block (indexed strategy only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_block: Option<usize>,

    /// Strategy that placed this file
    pub strategy: AllocationStrategy,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, data_blocks: Vec<usize>, strategy: AllocationStrategy) -> Self {
        FileEntry {
            name: name.into(),
            data_blocks,
            index_block: None,
            strategy,
        }
    }

    /// Attach an index block
    pub fn with_index_block(mut self, index_block: usize) -> Self {
        self.index_block = Some(index_block);
        self
    }

    /// Every block this entry references: index block first, then data blocks
    pub fn all_blocks(&self) -> Vec<usize> {
        self.index_block
            .iter()
            .copied()
            .chain(self.data_blocks.iter().copied())
            .collect()
    }

    /// Number of blocks this entry occupies on disk
    pub fn block_count(&self) -> usize {
        self.data_blocks.len() + usize::from(self.index_block.is_some())
    }
}

/// Insertion-ordered table of allocated files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTable {
    entries: Vec<FileEntry>,
}

impl FileTable {
    pub fn new() -> Self {
        FileTable::default()
    }

    /// Insert an entry
    ///
    /// The caller guarantees the name is not already present.
    pub fn insert(&mut self, entry: FileEntry) {
        debug_assert!(!self.contains(&entry.name));
        self.entries.push(entry);
    }

    /// Remove an entry by name
    ///
    /// Only the table is touched; freeing the entry's blocks is up to the caller.
    pub fn remove(&mut self, name: &str) -> Result<FileEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| SimError::NotFound(name.to_string()))?;

        Ok(self.entries.remove(pos))
    }

    pub fn lookup(&self, name: &str) -> Result<&FileEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| SimError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// All entries in insertion order
    pub fn all(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, blocks: Vec<usize>) -> FileEntry {
        FileEntry::new(name, blocks, AllocationStrategy::Contiguous)
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = FileTable::new();
        table.insert(entry("a.txt", vec![0, 1]));

        let found = table.lookup("a.txt").unwrap();
        assert_eq!(found.data_blocks, vec![0, 1]);
        assert!(table.contains("a.txt"));
        assert!(matches!(table.lookup("b.txt"), Err(SimError::NotFound(_))));
    }

    #[test]
    fn test_insertion_order() {
        let mut table = FileTable::new();
        table.insert(entry("zeta", vec![0]));
        table.insert(entry("alpha", vec![1]));
        table.insert(entry("mid", vec![2]));

        let names: Vec<_> = table.all().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_remove() {
        let mut table = FileTable::new();
        table.insert(entry("a", vec![0]));
        table.insert(entry("b", vec![1]));

        let removed = table.remove("a").unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(table.len(), 1);
        assert!(matches!(table.remove("a"), Err(SimError::NotFound(_))));
    }

    #[test]
    fn test_index_block_accounting() {
        let plain = entry("plain", vec![3, 4]);
        assert_eq!(plain.block_count(), 2);
        assert_eq!(plain.all_blocks(), vec![3, 4]);

        let indexed = FileEntry::new("idx", vec![7, 2], AllocationStrategy::Indexed)
            .with_index_block(5);
        assert_eq!(indexed.block_count(), 3);
        assert_eq!(indexed.all_blocks(), vec![5, 7, 2]);
    }
}
