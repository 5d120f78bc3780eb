// Constants for the PM/0 machine

/// Number of cells in the address space
pub const ADDRESS_SPACE_SIZE: usize = 500;

/// Index of the first loaded instruction word
/// Cells below this index are reserved and stay zero
pub const LOAD_OFFSET: usize = 10;

/// Default memory budget for the snapshot history (64 MB)
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 64 * 1024 * 1024;
