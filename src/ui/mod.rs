//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus, input mode
//! - **[`panes`]**: render functions for the code, stack, output and status panes
//! - **[`theme`]**: colour palette shared by all panes
//!
//! Construct an [`App`] from a [`Debugger`] and call [`App::run`] with a
//! ratatui terminal.
//!
//! [`Debugger`]: crate::interpreter::debugger::Debugger
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
