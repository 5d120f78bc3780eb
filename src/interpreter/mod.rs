//! PM/0 execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: The [`engine::Machine`] with its fetch/decode/execute cycle and lexical resolver
//! - [`isa`]: Instruction decoding
//! - [`trace`]: Per-step diagnostics with activation-record boundaries
//! - [`debugger`]: Snapshot-based stepping forward and backward
//! - [`errors`]: Load-time and runtime error types
//! - [`config`] / [`constants`]: Address-space layout
//!
//! # Execution Model
//!
//! The machine fetches one `(opcode, L, M)` triple at PC, advances PC by three,
//! then executes. Each step returns either `Running` or `Halted`, together
//! with a [`trace::TraceRow`] describing the state after the instruction.
//!
//! # Activation Records
//!
//! ```text
//! BP     -> static link   (base of the lexically enclosing frame)
//! BP - 1 -> dynamic link  (caller's BP)
//! BP - 2 -> return address
//! BP - 3 .. locals allocated by INC
//! ```

pub mod config;
pub mod constants;
pub mod debugger;
pub mod engine;
pub mod errors;
pub mod isa;
pub mod trace;
