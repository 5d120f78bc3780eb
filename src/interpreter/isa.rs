//! PM/0 instruction set
//!
//! Raw `(opcode, L, M)` triples are decoded into [`Instruction`] before
//! execution. OPR and SYS carry a nested sub-opcode in `M`, which decodes into
//! [`Operation`] and [`SysCall`] respectively.
//!
//! | Opcode | Mnemonic | Operands |
//! |--------|----------|----------|
//! | 1 | LIT | M = literal |
//! | 2 | OPR | M = operation (0 = RTN, 1..10 arithmetic/relational) |
//! | 3 | LOD | L = lexical distance, M = offset below frame base |
//! | 4 | STO | L = lexical distance, M = offset below frame base |
//! | 5 | CAL | L = lexical distance, M = target address |
//! | 6 | INC | M = cells to allocate |
//! | 7 | JMP | M = target address |
//! | 8 | JPC | M = target address |
//! | 9 | SYS | M = 1 output, 2 input, 3 halt |

use crate::parser::program::{RawInstruction, Word};
use std::fmt;

/// Sub-operations of opcode 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Rtn,
    Binary(BinaryOp),
}

/// Arithmetic and relational operators on the two topmost cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
}

impl Operation {
    fn decode(m: Word) -> Result<Self, DecodeError> {
        let op = match m {
            0 => return Ok(Operation::Rtn),
            1 => BinaryOp::Add,
            2 => BinaryOp::Sub,
            3 => BinaryOp::Mul,
            4 => BinaryOp::Div,
            5 => BinaryOp::Eql,
            6 => BinaryOp::Neq,
            7 => BinaryOp::Lss,
            8 => BinaryOp::Leq,
            9 => BinaryOp::Gtr,
            10 => BinaryOp::Geq,
            _ => return Err(DecodeError::UnknownOperation(m)),
        };
        Ok(Operation::Binary(op))
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Operation::Rtn => "RTN",
            Operation::Binary(op) => op.mnemonic(),
        }
    }
}

impl BinaryOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Div => "DIV",
            BinaryOp::Eql => "EQL",
            BinaryOp::Neq => "NEQ",
            BinaryOp::Lss => "LSS",
            BinaryOp::Leq => "LEQ",
            BinaryOp::Gtr => "GTR",
            BinaryOp::Geq => "GEQ",
        }
    }
}

/// Sub-operations of opcode 9
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysCall {
    Write,
    Read,
    Halt,
}

impl SysCall {
    fn decode(m: Word) -> Result<Self, DecodeError> {
        match m {
            1 => Ok(SysCall::Write),
            2 => Ok(SysCall::Read),
            3 => Ok(SysCall::Halt),
            _ => Err(DecodeError::UnknownSysCall(m)),
        }
    }
}

/// A decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Lit(Word),
    Opr(Operation),
    Lod { level: usize, offset: Word },
    Sto { level: usize, offset: Word },
    Cal { level: usize, target: Word },
    Inc(Word),
    Jmp(Word),
    Jpc(Word),
    Sys(SysCall),
}

impl Instruction {
    /// Decode a raw triple
    pub fn decode(raw: RawInstruction) -> Result<Self, DecodeError> {
        let RawInstruction { op, l, m } = raw;
        Ok(match op {
            1 => Instruction::Lit(m),
            2 => Instruction::Opr(Operation::decode(m)?),
            3 => Instruction::Lod {
                level: level(l)?,
                offset: m,
            },
            4 => Instruction::Sto {
                level: level(l)?,
                offset: m,
            },
            5 => Instruction::Cal {
                level: level(l)?,
                target: m,
            },
            6 => Instruction::Inc(m),
            7 => Instruction::Jmp(m),
            8 => Instruction::Jpc(m),
            9 => Instruction::Sys(SysCall::decode(m)?),
            _ => return Err(DecodeError::UnknownOpcode(op)),
        })
    }

    /// Mnemonic shown in traces. Every SYS call prints as `SYS`.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Lit(_) => "LIT",
            Instruction::Opr(op) => op.mnemonic(),
            Instruction::Lod { .. } => "LOD",
            Instruction::Sto { .. } => "STO",
            Instruction::Cal { .. } => "CAL",
            Instruction::Inc(_) => "INC",
            Instruction::Jmp(_) => "JMP",
            Instruction::Jpc(_) => "JPC",
            Instruction::Sys(_) => "SYS",
        }
    }
}

fn level(l: Word) -> Result<usize, DecodeError> {
    usize::try_from(l).map_err(|_| DecodeError::NegativeLevel(l))
}

/// Best-effort mnemonic for a raw triple, used by listings
pub fn disassemble(raw: RawInstruction) -> &'static str {
    match Instruction::decode(raw) {
        Ok(instruction) => instruction.mnemonic(),
        Err(_) => "???",
    }
}

/// Why a triple could not be decoded. Decoding failures halt the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    UnknownOpcode(Word),
    UnknownOperation(Word),
    UnknownSysCall(Word),
    NegativeLevel(Word),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownOpcode(op) => write!(f, "Unknown instruction {}", op),
            DecodeError::UnknownOperation(m) => write!(f, "Unknown OPR instruction {}", m),
            DecodeError::UnknownSysCall(m) => write!(f, "Unknown SYS instruction {}", m),
            DecodeError::NegativeLevel(l) => write!(f, "Negative lexical level {}", l),
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(op: Word, l: Word, m: Word) -> Result<Instruction, DecodeError> {
        Instruction::decode(RawInstruction::new(op, l, m))
    }

    #[test]
    fn test_decode_primary_opcodes() {
        assert_eq!(decode(1, 0, 7), Ok(Instruction::Lit(7)));
        assert_eq!(
            decode(3, 2, 4),
            Ok(Instruction::Lod {
                level: 2,
                offset: 4
            })
        );
        assert_eq!(
            decode(5, 1, 40),
            Ok(Instruction::Cal {
                level: 1,
                target: 40
            })
        );
        assert_eq!(decode(8, 0, 31), Ok(Instruction::Jpc(31)));
    }

    #[test]
    fn test_decode_sub_opcodes() {
        assert_eq!(decode(2, 0, 0), Ok(Instruction::Opr(Operation::Rtn)));
        assert_eq!(
            decode(2, 0, 10),
            Ok(Instruction::Opr(Operation::Binary(BinaryOp::Geq)))
        );
        assert_eq!(decode(9, 0, 2), Ok(Instruction::Sys(SysCall::Read)));
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(decode(99, 0, 0), Err(DecodeError::UnknownOpcode(99)));
        assert_eq!(decode(0, 0, 0), Err(DecodeError::UnknownOpcode(0)));
        assert_eq!(decode(2, 0, 11), Err(DecodeError::UnknownOperation(11)));
        assert_eq!(decode(9, 0, 4), Err(DecodeError::UnknownSysCall(4)));
        assert_eq!(decode(4, -1, 3), Err(DecodeError::NegativeLevel(-1)));
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(disassemble(RawInstruction::new(2, 0, 4)), "DIV");
        assert_eq!(disassemble(RawInstruction::new(9, 0, 3)), "SYS");
        assert_eq!(disassemble(RawInstruction::new(42, 0, 0)), "???");
        assert_eq!(
            DecodeError::UnknownOpcode(99).to_string(),
            "Unknown instruction 99"
        );
    }
}
