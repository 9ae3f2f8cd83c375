//! TUI pane rendering modules
//!
//! Each pane is a stateless render function fed from one execution snapshot.
//!
//! # Pane Modules
//!
//! - [`source`]: Program text with syntax highlighting and the current line
//! - [`variables`]: Scope frames and live variables
//! - [`memory`]: Bucket layout and raw bits of the simulated memory
//! - [`terminal`]: Program output printed so far
//! - [`status`]: Status bar with keybindings and execution state

pub mod memory;
pub mod source;
pub mod status;
pub mod terminal;
pub mod variables;

// Re-export render functions for convenience
pub use memory::{render_memory_pane, MemoryRenderData};
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use terminal::render_terminal_pane;
pub use variables::{render_variables_pane, ListScrollState, VariablesRenderData};
