//! # Introduction
//!
//! pm0vm loads and executes programs for the PM/0 stack machine, the target of
//! a small block-structured language with nested procedures. After every
//! instruction it reports the registers and the live stack with activation
//! record boundaries, either as a streamed text trace or in a terminal UI
//! that steps forward and backward through execution.
//!
//! ## Execution pipeline
//!
//! ```text
//! Program text → Lexer → Parser → Program → Machine → TraceRows → stdout / TUI
//! ```
//!
//! 1. [`parser`]: tokenises the integer triples and builds a [`parser::program::Program`].
//! 2. [`memory`]: the fixed-size [`memory::AddressSpace`] shared by code and
//!    stack, plus the [`memory::frames::FrameTracker`].
//! 3. [`interpreter`]: the [`interpreter::engine::Machine`], instruction
//!    decoding, per-step [`interpreter::trace::TraceRow`]s and the
//!    [`interpreter::debugger::Debugger`].
//! 4. [`console`]: the SYS input/output collaborator.
//! 5. [`snapshot`]: snapshot history with a memory limit and a
//!    [`snapshot::MockTerminal`] that records program output.
//! 6. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use pm0vm::console::BufferedConsole;
//! use pm0vm::interpreter::{config::VmConfig, engine::Machine};
//! use pm0vm::parser::parse::parse_program;
//!
//! let program = parse_program("1 0 5\n1 0 3\n2 0 1\n9 0 1\n9 0 3\n").unwrap();
//! let mut machine = Machine::load(&program, &VmConfig::default()).unwrap();
//! let mut console = BufferedConsole::new();
//! machine.run(&mut console, |_| {}).unwrap();
//! assert_eq!(console.outputs(), vec![8]);
//! ```

pub mod console;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod snapshot;
pub mod ui;
