//! Machine layout configuration

use super::constants::{ADDRESS_SPACE_SIZE, LOAD_OFFSET};
use super::errors::LoadError;

/// Layout of the address space used when loading a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Total number of cells
    pub capacity: usize,
    /// Index where the first instruction word is loaded
    pub load_offset: usize,
}

impl VmConfig {
    pub fn new(capacity: usize, load_offset: usize) -> Self {
        VmConfig {
            capacity,
            load_offset,
        }
    }

    /// Reject layouts that leave no room for a stack or cannot be addressed by a word
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.capacity == 0 || self.load_offset >= self.capacity {
            return Err(LoadError::InvalidConfig {
                message: format!(
                    "load offset {} must be below capacity {}",
                    self.load_offset, self.capacity
                ),
            });
        }
        if i32::try_from(self.capacity).is_err() {
            return Err(LoadError::InvalidConfig {
                message: format!("capacity {} does not fit in a machine word", self.capacity),
            });
        }
        Ok(())
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig::new(ADDRESS_SPACE_SIZE, LOAD_OFFSET)
    }
}
