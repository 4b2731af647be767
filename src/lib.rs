//! # blocksim - Disk Allocation Simulator
//!
//! `blocksim` models a small virtual disk as a fixed array of blocks and
//! places files on it with one of the classical allocation strategies:
//!
//! - **Contiguous**: one run of consecutive blocks (first fit)
//! - **Chained**: blocks scattered at random, each carrying a successor pointer
//! - **Indexed**: one index block plus scattered data blocks
//!
//! Allocation is all-or-nothing: a request that cannot be satisfied leaves the
//! disk exactly as it was.
//!
//! ## Quick Start
//!
//! ```rust
//! use blocksim::{AllocationStrategy, Result, Simulation};
//!
//! # fn main() -> Result<()> {
//! let mut sim = Simulation::new(20, AllocationStrategy::Contiguous)?;
//!
//! let entry = sim.allocate("notes.txt", 4)?;
//! assert_eq!(entry.data_blocks, vec![0, 1, 2, 3]);
//!
//! sim.delete_file("notes.txt")?;
//! assert_eq!(sim.store().count_free(), 20);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reproducible Placement
//!
//! ```rust
//! use blocksim::{AllocationStrategy, Result, SimulationBuilder};
//!
//! # fn main() -> Result<()> {
//! let mut sim = SimulationBuilder::new()
//!     .disk_size(64)
//!     .strategy(AllocationStrategy::Indexed)
//!     .seed(7)
//!     .build()?;
//!
//! let entry = sim.allocate("db", 5)?;
//! assert!(entry.index_block.is_some());
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules so crate:: paths in core resolve
pub use crate::core::{allocator, block, catalog, config, disk, error, validation};

pub use crate::core::{
    allocator::{engine::AllocationEngine, AllocationStrategy, BlockAllocator},
    block::{Block, BlockRole, BlockStore, FreeRun, DEFAULT_DISK_SIZE, MAX_DISK_SIZE},
    catalog::{FileEntry, FileTable},
    config::SimConfig,
    disk::{DiskSnapshot, DiskState, DiskStats},
    error::{Result, SimError},
    validation::FileName,
};

use tracing::{debug, info};

/// Disk allocation simulation
///
/// Owns the disk state and the allocation engine. All operations run to
/// completion synchronously; a failed operation never leaves partial state.
///
/// # Examples
///
/// ```rust
/// use blocksim::{AllocationStrategy, Simulation};
///
/// # fn main() -> blocksim::Result<()> {
/// let mut sim = Simulation::new(8, AllocationStrategy::Chained)?;
/// sim.allocate("a", 3)?;
/// assert_eq!(sim.store().count_free(), 5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Simulation {
    state: DiskState,
    engine: AllocationEngine,
}

impl Simulation {
    /// Create a simulation with `size` free blocks and an entropy-seeded engine
    pub fn new(size: usize, strategy: AllocationStrategy) -> Result<Self> {
        Self::with_engine(size, MAX_DISK_SIZE, strategy, AllocationEngine::from_entropy())
    }

    /// Create a simulation with an explicit engine (e.g. a seeded one)
    pub fn with_engine(
        size: usize,
        max_disk_size: usize,
        strategy: AllocationStrategy,
        engine: AllocationEngine,
    ) -> Result<Self> {
        info!("Creating simulation: {} blocks, {} allocation", size, strategy);
        let state = DiskState::new(size, max_disk_size, strategy)?;
        Ok(Simulation { state, engine })
    }

    /// Build a simulation from a configuration
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        config.validate()?;
        let engine = match config.seed {
            Some(seed) => AllocationEngine::seeded(seed),
            None => AllocationEngine::from_entropy(),
        };
        Self::with_engine(config.disk_size, config.max_disk_size, config.strategy, engine)
    }

    /// Re-arm the simulation with `size` free blocks and `strategy`
    ///
    /// Every existing file is discarded. An invalid size changes nothing.
    pub fn initialize(&mut self, size: usize, strategy: AllocationStrategy) -> Result<()> {
        self.state.initialize(size, strategy)
    }

    /// Select the strategy used for subsequent allocations
    pub fn set_strategy(&mut self, strategy: AllocationStrategy) {
        info!("Switching allocation strategy to {}", strategy);
        self.state.set_strategy(strategy);
    }

    pub fn strategy(&self) -> AllocationStrategy {
        self.state.strategy()
    }

    /// Allocate `block_count` data blocks for a new file
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty name or a zero block count
    /// - `DuplicateName` if the name is already allocated
    /// - `InsufficientSpace` if the current strategy cannot place the file
    pub fn allocate(&mut self, name: &str, block_count: usize) -> Result<FileEntry> {
        let name = FileName::new(name)?;
        let block_count = validation::validate_block_count(block_count)?;

        if self.state.table().contains(name.as_str()) {
            return Err(SimError::DuplicateName(name.into_string()));
        }

        let strategy = self.state.strategy();
        debug!(
            "Allocating {} block(s) for {} ({})",
            block_count, name, strategy
        );

        let entry = self.engine.allocate(
            self.state.store_mut(),
            name.as_str(),
            block_count,
            strategy,
        )?;

        self.state.insert_entry(entry.clone());
        Ok(entry)
    }

    /// Delete a file and free its blocks (index block included)
    pub fn delete_file(&mut self, name: &str) -> Result<FileEntry> {
        debug!("Deleting {}", name);
        self.state.delete_file(name.trim())
    }

    /// Look up a file's allocation descriptor
    pub fn lookup(&self, name: &str) -> Result<&FileEntry> {
        self.state.table().lookup(name.trim())
    }

    /// Blocks to highlight for a selected file (index block first)
    pub fn file_blocks(&self, name: &str) -> Result<Vec<usize>> {
        self.state.file_blocks(name.trim())
    }

    pub fn store(&self) -> &BlockStore {
        self.state.store()
    }

    pub fn table(&self) -> &FileTable {
        self.state.table()
    }

    pub fn state(&self) -> &DiskState {
        &self.state
    }

    pub fn snapshot(&self) -> DiskSnapshot {
        self.state.snapshot()
    }

    pub fn stats(&self) -> DiskStats {
        self.state.stats()
    }

    /// Check the block/file partition invariant
    pub fn verify(&self) -> Result<()> {
        self.state.verify()
    }
}

/// Builder for customizing Simulation creation
///
/// # Examples
///
/// ```rust
/// use blocksim::{AllocationStrategy, SimulationBuilder};
///
/// # fn main() -> blocksim::Result<()> {
/// let sim = SimulationBuilder::new()
///     .disk_size(32)
///     .strategy(AllocationStrategy::Chained)
///     .seed(42)
///     .build()?;
/// assert_eq!(sim.store().len(), 32);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    config: SimConfig,
}

impl SimulationBuilder {
    /// Create a new SimulationBuilder with default settings
    pub fn new() -> Self {
        SimulationBuilder::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: SimConfig) -> Self {
        SimulationBuilder { config }
    }

    /// Set the number of blocks
    pub fn disk_size(mut self, size: usize) -> Self {
        self.config.disk_size = size;
        self
    }

    /// Set the largest accepted disk size
    pub fn max_disk_size(mut self, max: usize) -> Self {
        self.config.max_disk_size = max;
        self
    }

    /// Set the allocation strategy
    pub fn strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Seed random placement for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the Simulation instance
    pub fn build(self) -> Result<Simulation> {
        debug!("Building simulation from {:?}", self.config);
        Simulation::from_config(&self.config)
    }
}
