//! Allocation engine and disk model
//!
//! - [`error`] - Error types for simulation operations
//! - [`block`] - Block records and the fixed-size block store
//! - [`catalog`] - File entries and the allocation table
//! - [`allocator`] - Contiguous, chained and indexed placement
//! - [`disk`] - Disk state, deletion workflow, snapshots and statistics
//! - [`config`] - TOML configuration
//! - [`validation`] - File name and block count checks

pub mod allocator;
pub mod block;
pub mod catalog;
pub mod config;
pub mod disk;
pub mod error;
pub mod validation;
