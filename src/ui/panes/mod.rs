//! TUI pane rendering modules
//!
//! - [`code`]: Instruction listing with the PC row highlighted
//! - [`stack`]: Stack cells grouped into activation records
//! - [`terminal`]: Values written and read by SYS
//! - [`status`]: Status bar with keybindings and execution state
//!
//! Each pane exports a `render_*` function plus the scroll or render state
//! it needs. Border and scrolling helpers live in `utils`.

mod utils;

pub mod code;
pub mod stack;
pub mod status;
pub mod terminal;

pub use code::{render_code_pane, CodeRenderData, CodeScrollState};
pub use stack::{render_stack_pane, StackRenderData, StackScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use terminal::render_terminal_pane;
