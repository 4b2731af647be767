//! Validation for user-supplied file names and block counts
//!
//! These checks run at the simulation boundary before the allocation engine
//! is involved, so the engine can assume a non-empty name and a positive count.

use crate::error::{Result, SimError};

/// Validated file name
///
/// # Rules
/// - Leading and trailing whitespace is trimmed
/// - Must not be empty after trimming
/// - Length: 1-255 bytes
/// - No control characters
///
/// # Examples
///
/// ```
/// use blocksim::FileName;
///
/// let name = FileName::new("  report.txt ").unwrap();
/// assert_eq!(name.as_str(), "report.txt");
///
/// assert!(FileName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    /// Maximum length in bytes
    const MAX_LENGTH: usize = 255;

    /// Create a new validated file name
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the name breaks any of the rules above.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref().trim();

        if name.is_empty() {
            return Err(SimError::InvalidInput(
                "file name cannot be empty".to_string(),
            ));
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(SimError::InvalidInput(format!(
                "file name too long (max {} characters)",
                Self::MAX_LENGTH
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(SimError::InvalidInput(format!(
                "file name {:?} contains control characters",
                name
            )));
        }

        Ok(FileName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check that a block count is positive
pub fn validate_block_count(block_count: usize) -> Result<usize> {
    if block_count == 0 {
        return Err(SimError::InvalidInput(
            "block count must be a positive integer".to_string(),
        ));
    }
    Ok(block_count)
}

/// Parse a user-entered block count
///
/// # Examples
///
/// ```
/// use blocksim::validation::parse_block_count;
///
/// assert_eq!(parse_block_count(" 4 ").unwrap(), 4);
/// assert!(parse_block_count("0").is_err());
/// assert!(parse_block_count("four").is_err());
/// ```
pub fn parse_block_count(input: &str) -> Result<usize> {
    let block_count = input.trim().parse::<usize>().map_err(|_| {
        SimError::InvalidInput(format!(
            "block count {:?} is not a positive integer",
            input.trim()
        ))
    })?;

    validate_block_count(block_count)
}

/// Parse a user-entered disk size and check it against `max_size`
pub fn parse_disk_size(input: &str, max_size: usize) -> Result<usize> {
    let size = input.trim().parse::<usize>().map_err(|_| {
        SimError::InvalidInput(format!("disk size {:?} is not a number", input.trim()))
    })?;

    if size == 0 || size > max_size {
        return Err(SimError::InvalidSize {
            size,
            max: max_size,
        });
    }
    Ok(size)
}
