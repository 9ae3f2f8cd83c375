//! # Introduction
//!
//! brackit interprets a small bracket-block teaching language directly from
//! its source text and stores every variable as bits in a simulated memory
//! region. An optional snapshot history can be navigated afterwards in a
//! terminal UI built with [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Cursor → Interpreter ⇄ Scope ⇄ Ram → Snapshots → TUI
//! ```
//!
//! 1. [`source`]: the character cursor with bookmarks for re-reading text.
//! 2. [`interpreter`]: executes statements as they are read, re-seeking the
//!    cursor for loops and method calls.
//! 3. [`memory`]: bit-level storage: integer, double, char, word and boolean
//!    layouts in one bump-allocated region with compaction.
//! 4. [`snapshot`]: output capture and the execution history.
//! 5. [`ui`]: ratatui-based inspector; not part of the stable library API.
//!
//! ## Example
//!
//! ```text
//! program [
//!   integer total = 0
//!   command start()
//!   [
//!     for(integer i = 1; i <= 5; i = i + 1)[ total = total + square(i) ]
//!     outputNL total
//!   ]
//! ]
//! command square(integer n) gives integer [
//!   give n * n
//! ]
//! ```

pub mod config;
pub mod interpreter;
pub mod memory;
pub mod snapshot;
pub mod source;
pub mod stack;
pub mod ui;
