use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid disk size: {size} (must be between 1 and {max})")]
    InvalidSize { size: usize, max: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File already exists: {0}")]
    DuplicateName(String),

    #[error("Insufficient space: cannot place {requested} blocks ({free} free)")]
    InsufficientSpace { requested: usize, free: usize },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid block ID: {0}")]
    InvalidBlockId(usize),

    #[error("Block already allocated: {0}")]
    BlockAlreadyAllocated(usize),

    #[error("Disk state inconsistent: {0}")]
    Inconsistent(String),

    #[error("Unknown allocation strategy: {0} (expected contiguous, chained or indexed)")]
    UnknownStrategy(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
