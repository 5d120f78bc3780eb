//! Per-step diagnostics
//!
//! After every executed instruction the engine captures a [`TraceRow`]: the
//! instruction that ran, the registers after it ran, and every occupied stack
//! cell from the top of the address space down to the stack pointer. Cells
//! where an activation record begins are flagged so renderers can draw a
//! boundary before them.
//!
//! Capturing is a pure read of machine state.
//!
//! # Text layout
//!
//! ```text
//!                 PC  BP  SP  stack
//! Initial values:         10  499 500
//!
//!     LIT 0   5   13  499 499 5
//!     CAL 0   22  16  498 499 5 | 0 499 16
//! ```

use super::engine::Registers;
use crate::memory::frames::FrameTracker;
use crate::memory::{Addr, AddressSpace};
use crate::parser::program::{RawInstruction, Word};
use std::fmt;

/// One occupied stack cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackCell {
    pub addr: Addr,
    pub value: Word,
    /// An activation record starts at this cell
    pub frame_start: bool,
}

/// Machine state after one instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    /// 1-based count of executed instructions
    pub step: usize,
    /// Address the instruction was fetched from
    pub at: Addr,
    pub instruction: RawInstruction,
    pub mnemonic: &'static str,
    pub registers: Registers,
    /// Stack-bottom first (highest address first)
    pub stack: Vec<StackCell>,
}

impl TraceRow {
    pub fn capture(
        step: usize,
        at: Addr,
        instruction: RawInstruction,
        mnemonic: &'static str,
        registers: Registers,
        memory: &AddressSpace,
        frames: &FrameTracker,
    ) -> Self {
        TraceRow {
            step,
            at,
            instruction,
            mnemonic,
            registers,
            stack: stack_cells(memory, frames, registers.sp),
        }
    }

    /// Values only, stack-bottom first
    pub fn stack_values(&self) -> Vec<Word> {
        self.stack.iter().map(|cell| cell.value).collect()
    }
}

/// Occupied cells from the top of the address space down to `sp`
pub fn stack_cells(memory: &AddressSpace, frames: &FrameTracker, sp: Addr) -> Vec<StackCell> {
    let boundaries = frames.boundary_set();
    let cells = memory.cells();
    let low = sp.index().min(cells.len());

    (low..cells.len())
        .rev()
        .map(|index| {
            let addr = Addr::new(index);
            StackCell {
                addr,
                value: cells[index],
                frame_start: boundaries.contains(&addr),
            }
        })
        .collect()
}

impl fmt::Display for TraceRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\t{}\t{}\t{}\t{}\t{}\t{}\t",
            self.mnemonic,
            self.instruction.l,
            self.instruction.m,
            self.registers.pc,
            self.registers.bp,
            self.registers.sp
        )?;
        for cell in &self.stack {
            if cell.frame_start {
                write!(f, "| ")?;
            }
            write!(f, "{} ", cell.value)?;
        }
        Ok(())
    }
}

/// Column header printed once before the first row
pub fn header() -> &'static str {
    "\t\t\t\tPC\tBP\tSP\tstack"
}

/// Register values before the first instruction
pub fn initial_values(registers: &Registers) -> String {
    format!(
        "Initial values:\t\t\t{}\t{}\t{}",
        registers.pc, registers.bp, registers.sp
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::config::VmConfig;
    use crate::parser::program::Program;

    #[test]
    fn test_row_marks_frame_boundaries() {
        let program = Program::from_triples(&[(9, 0, 3)]);
        let mut memory = AddressSpace::load(&program, &VmConfig::default()).unwrap();
        for (index, value) in [(499, 5), (498, 0), (497, 499), (496, 16)] {
            memory.write(Addr::new(index), value).unwrap();
        }
        let mut frames = FrameTracker::new();
        frames.push(Addr::new(498));

        let registers = Registers {
            pc: Addr::new(22),
            bp: Addr::new(498),
            sp: Addr::new(496),
        };
        let row = TraceRow::capture(
            2,
            Addr::new(13),
            RawInstruction::new(5, 0, 22),
            "CAL",
            registers,
            &memory,
            &frames,
        );

        assert_eq!(row.stack_values(), vec![5, 0, 499, 16]);
        assert!(row.stack[1].frame_start);
        assert!(!row.stack[0].frame_start);
        assert_eq!(row.to_string(), "\tCAL\t0\t22\t22\t498\t496\t5 | 0 499 16 ");
    }

    #[test]
    fn test_empty_stack() {
        let memory = AddressSpace::load(&Program::new(), &VmConfig::default()).unwrap();
        let cells = stack_cells(&memory, &FrameTracker::new(), Addr::new(500));
        assert!(cells.is_empty());
    }
}
