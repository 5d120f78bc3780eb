//! Error types for the PM/0 machine
//!
//! Two families of errors are defined here:
//!
//! - [`LoadError`]: problems found before execution begins (unreadable file,
//!   malformed program text, program too large for the address space)
//! - [`VmError`]: faults raised while executing an instruction
//!
//! Unknown opcodes are not errors in this sense. They are reported through
//! [`crate::interpreter::isa::DecodeError`] and halt the machine normally.
//!
//! All runtime faults are fatal for the run in which they occur.

use crate::parser::parse::ParseError;
use std::fmt;

/// Errors raised before the first instruction runs
#[derive(Debug)]
pub enum LoadError {
    /// The program file could not be read
    Io { path: String, message: String },

    /// The program text is malformed
    Parse(ParseError),

    /// The loaded words would reach the end of the address space
    ProgramTooLarge {
        instructions: usize,
        end: usize,
        capacity: usize,
    },

    /// The address-space layout itself is unusable
    InvalidConfig { message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, message } => {
                write!(f, "Cannot open file {}: {}", path, message)
            }
            LoadError::Parse(err) => write!(f, "{}", err),
            LoadError::ProgramTooLarge {
                instructions,
                end,
                capacity,
            } => {
                write!(
                    f,
                    "Instructions exceed address space: {} instructions end at cell {}, capacity is {}",
                    instructions, end, capacity
                )
            }
            LoadError::InvalidConfig { message } => {
                write!(f, "Invalid machine configuration: {}", message)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::Parse(err)
    }
}

/// Runtime faults raised by the execution engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// A register or link pointed outside the address space
    AddressOutOfBounds { address: i64, capacity: usize },

    /// Attempted to overwrite a loaded instruction or the reserved area
    CodeRegionWrite { address: usize, code_end: usize },

    /// DIV with a zero right operand
    DivisionByZero,

    /// Arithmetic result does not fit in a word
    ArithmeticOverflow {
        operation: &'static str,
        left: i32,
        right: i32,
    },

    /// SYS input was requested but no value has been supplied yet.
    /// The machine is left untouched so the step can be retried.
    InputRequired,

    /// The input source failed or produced something that is not an integer
    InputUnavailable { message: String },

    /// A step was requested after the machine halted
    AlreadyHalted,

    /// Snapshot history limit exceeded
    SnapshotLimitExceeded { current: usize, limit: usize },

    /// History/snapshot operation failed
    HistoryOperationFailed { message: String },
}

impl VmError {
    /// Whether the run can continue once the caller supplies more input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VmError::InputRequired)
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::AddressOutOfBounds { address, capacity } => {
                write!(
                    f,
                    "Address {} is outside the address space (0..{})",
                    address, capacity
                )
            }
            VmError::CodeRegionWrite { address, code_end } => {
                write!(
                    f,
                    "Write to cell {} would overwrite the program region (below {})",
                    address, code_end
                )
            }
            VmError::DivisionByZero => write!(f, "Division by zero"),
            VmError::ArithmeticOverflow {
                operation,
                left,
                right,
            } => {
                write!(
                    f,
                    "Integer overflow in {}: {} and {}",
                    operation, left, right
                )
            }
            VmError::InputRequired => write!(f, "Waiting for input"),
            VmError::InputUnavailable { message } => {
                write!(f, "Input unavailable: {}", message)
            }
            VmError::AlreadyHalted => write!(f, "Machine has already halted"),
            VmError::SnapshotLimitExceeded { current, limit } => {
                write!(
                    f,
                    "Snapshot memory limit exceeded: {} bytes used, limit is {}",
                    current, limit
                )
            }
            VmError::HistoryOperationFailed { message } => {
                write!(f, "History operation failed: {}", message)
            }
        }
    }
}

impl std::error::Error for VmError {}
