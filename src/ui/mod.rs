//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]** holds application state, the keyboard event loop and pane focus
//! - **[`panes`]** has stateless render functions for each visible pane (source,
//!   variables, memory, output, status bar)
//! - **[`theme`]** is the color palette shared by all panes
//!
//! The entry point for consumers is [`App`]: construct it with an [`Interpreter`]
//! that recorded its history and call [`App::run`] to start the event loop.
//! Every pane draws from the snapshot at the interpreter's history position.
//!
//! [`Interpreter`]: crate::interpreter::engine::Interpreter
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
