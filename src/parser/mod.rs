//! PM/0 program loader
//!
//! This module turns the textual instruction format into a [`program::Program`]:
//! - [`lexer`]: Tokenization (program text → signed integer words)
//! - [`parse`]: Grouping words into `(opcode, L, M)` triples
//! - [`program`]: Loaded program and raw instruction definitions
//!
//! # Input Format
//!
//! A program is a sequence of whitespace or line separated integers, read three
//! at a time as one instruction each:
//!
//! ```text
//! 7 0 45
//! 1 0 5
//! 9 0 1
//! ```
//!
//! Opcodes are not validated here. An unknown opcode is only reported when the
//! machine reaches it at runtime.

pub mod lexer;
pub mod parse;
pub mod program;

use crate::interpreter::errors::LoadError;
use program::Program;
use std::fs;
use std::path::Path;

/// Read and parse a program file
pub fn read_program(path: &Path) -> Result<Program, LoadError> {
    let source = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(parse::parse_program(&source)?)
}
