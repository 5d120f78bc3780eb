//! Memory model for the PM/0 machine
//!
//! This module provides the core memory abstractions:
//! - [`AddressSpace`]: the single fixed-size array of cells shared by code and stack
//! - [`Addr`]: a cell index used for every register
//! - [`frames`]: the frame tracker recording open activation records
//!
//! # Layout
//!
//! ```text
//! 0            load_offset        code_end                      capacity
//! | reserved   | instructions     | free ...  <- stack grows ... |
//! ```
//!
//! Instruction words are immutable once loaded: any write below `code_end`
//! is a fault. Every read and write is bounds-checked.

pub mod frames;

use crate::interpreter::config::VmConfig;
use crate::interpreter::errors::{LoadError, VmError};
use crate::parser::program::{Program, RawInstruction, Word, INSTRUCTION_WIDTH};
use std::fmt;

/// Index of a cell in the address space
///
/// Construction never fails; validity against the capacity is checked when
/// the address is dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Addr(usize);

impl Addr {
    pub const fn new(index: usize) -> Self {
        Addr(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    /// Convert the address to a word so it can be stored in a cell
    pub fn to_word(self) -> Word {
        // capacity is validated to fit in a word when the space is created
        self.0 as Word
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The process address space
#[derive(Debug, Clone)]
pub struct AddressSpace {
    cells: Vec<Word>,
    load_offset: usize,
    code_end: usize,
}

impl AddressSpace {
    /// Create a zeroed address space and copy the program in at the load offset
    pub fn load(program: &Program, config: &VmConfig) -> Result<Self, LoadError> {
        config.validate()?;

        let end = config.load_offset + program.word_count();
        if end >= config.capacity {
            return Err(LoadError::ProgramTooLarge {
                instructions: program.len(),
                end,
                capacity: config.capacity,
            });
        }

        let mut cells = vec![0; config.capacity];
        for (i, instruction) in program.instructions.iter().enumerate() {
            let start = config.load_offset + i * INSTRUCTION_WIDTH;
            cells[start..start + INSTRUCTION_WIDTH].copy_from_slice(&instruction.words());
        }

        Ok(AddressSpace {
            cells,
            load_offset: config.load_offset,
            code_end: end,
        })
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn load_offset(&self) -> usize {
        self.load_offset
    }

    /// First cell after the loaded instructions
    pub fn code_end(&self) -> usize {
        self.code_end
    }

    /// Read a cell
    pub fn read(&self, addr: Addr) -> Result<Word, VmError> {
        self.cells
            .get(addr.index())
            .copied()
            .ok_or_else(|| self.out_of_bounds(addr.index() as i64))
    }

    /// Check that `addr` is a data cell that [`AddressSpace::write`] would accept
    pub fn check_writable(&self, addr: Addr) -> Result<(), VmError> {
        if addr.index() < self.code_end {
            return Err(VmError::CodeRegionWrite {
                address: addr.index(),
                code_end: self.code_end,
            });
        }
        if addr.index() >= self.capacity() {
            return Err(self.out_of_bounds(addr.index() as i64));
        }
        Ok(())
    }

    /// Write a cell outside the program region
    pub fn write(&mut self, addr: Addr, value: Word) -> Result<(), VmError> {
        self.check_writable(addr)?;
        self.cells[addr.index()] = value;
        Ok(())
    }

    /// Fetch the instruction triple starting at `addr`
    pub fn fetch(&self, addr: Addr) -> Result<RawInstruction, VmError> {
        let op = self.read(addr)?;
        let l = self.read(self.offset(addr, 1)?)?;
        let m = self.read(self.offset(addr, 2)?)?;
        Ok(RawInstruction::new(op, l, m))
    }

    /// `addr + delta` as a register value
    ///
    /// The result may equal the capacity (an empty stack) but not exceed it.
    pub fn offset(&self, addr: Addr, delta: i64) -> Result<Addr, VmError> {
        let target = addr.index() as i64 + delta;
        self.addr_from(target)
    }

    /// Interpret a stored word (a link or jump target) as an address
    pub fn addr_from_word(&self, word: Word) -> Result<Addr, VmError> {
        self.addr_from(i64::from(word))
    }

    fn addr_from(&self, target: i64) -> Result<Addr, VmError> {
        if target < 0 || target > self.capacity() as i64 {
            return Err(self.out_of_bounds(target));
        }
        Ok(Addr::new(target as usize))
    }

    fn out_of_bounds(&self, address: i64) -> VmError {
        VmError::AddressOutOfBounds {
            address,
            capacity: self.capacity(),
        }
    }

    /// All cells, including code
    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    /// The writable region above the program
    pub fn data_region(&self) -> &[Word] {
        &self.cells[self.code_end..]
    }

    /// Overwrite the writable region with a previously captured copy
    pub fn restore_data_region(&mut self, data: &[Word]) {
        let region = &mut self.cells[self.code_end..];
        let len = region.len().min(data.len());
        region[..len].copy_from_slice(&data[..len]);
    }

    /// The loaded program, one triple per instruction
    pub fn instructions(&self) -> impl Iterator<Item = (Addr, RawInstruction)> + '_ {
        self.cells[self.load_offset..self.code_end]
            .chunks_exact(INSTRUCTION_WIDTH)
            .enumerate()
            .map(move |(i, words)| {
                (
                    Addr::new(self.load_offset + i * INSTRUCTION_WIDTH),
                    RawInstruction::new(words[0], words[1], words[2]),
                )
            })
    }
}
