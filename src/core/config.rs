//! Simulation configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid:
//!
//! ```toml
//! disk_size = 32
//! max_disk_size = 256
//! strategy = "indexed"
//! seed = 7
//! ```

use crate::allocator::AllocationStrategy;
use crate::block::{DEFAULT_DISK_SIZE, MAX_DISK_SIZE};
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of blocks on the simulated disk
    pub disk_size: usize,

    /// Upper bound accepted by `initialize`
    pub max_disk_size: usize,

    /// Strategy used for new files
    pub strategy: AllocationStrategy,

    /// Seed for random placement (entropy when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            disk_size: DEFAULT_DISK_SIZE,
            max_disk_size: MAX_DISK_SIZE,
            strategy: AllocationStrategy::default(),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading config from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check that the disk size fits within the configured maximum
    pub fn validate(&self) -> Result<()> {
        if self.disk_size == 0 || self.disk_size > self.max_disk_size {
            return Err(SimError::InvalidSize {
                size: self.disk_size,
                max: self.max_disk_size,
            });
        }
        Ok(())
    }
}
