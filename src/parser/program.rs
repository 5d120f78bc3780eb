//! Loaded program representation
//!
//! A [`Program`] is the ordered list of [`RawInstruction`] triples read from the
//! program text. Triples are kept undecoded so that a bad opcode only surfaces
//! when the machine fetches it.

use std::fmt;

/// A single machine word
pub type Word = i32;

/// Number of cells occupied by one instruction (opcode, L, M)
pub const INSTRUCTION_WIDTH: usize = 3;

/// Position in the program text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// An undecoded instruction triple as it appears in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstruction {
    pub op: Word,
    pub l: Word,
    pub m: Word,
}

impl RawInstruction {
    pub fn new(op: Word, l: Word, m: Word) -> Self {
        Self { op, l, m }
    }

    /// The three words in load order
    pub fn words(&self) -> [Word; INSTRUCTION_WIDTH] {
        [self.op, self.l, self.m]
    }
}

impl fmt::Display for RawInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.op, self.l, self.m)
    }
}

/// A parsed program with the text line of each instruction
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<RawInstruction>,
    pub locations: Vec<SourceLocation>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a program directly from triples (no source locations)
    pub fn from_triples(triples: &[(Word, Word, Word)]) -> Self {
        let instructions: Vec<RawInstruction> = triples
            .iter()
            .map(|&(op, l, m)| RawInstruction::new(op, l, m))
            .collect();
        let locations = (1..=instructions.len())
            .map(|line| SourceLocation::new(line, 1))
            .collect();
        Program {
            instructions,
            locations,
        }
    }

    pub fn push(&mut self, instruction: RawInstruction, location: SourceLocation) {
        self.instructions.push(instruction);
        self.locations.push(location);
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of memory cells the program occupies once loaded
    pub fn word_count(&self) -> usize {
        self.instructions.len() * INSTRUCTION_WIDTH
    }
}
