//! Interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: the [`Interpreter`](engine::Interpreter), program structure,
//!   block dispatch and history
//! - [`expressions`]: arithmetic, boolean and typed value evaluation
//! - [`statements`] / [`loops`]: statements and control constructs
//! - [`methods`]: method pre-scan and the call protocol
//! - [`scope`]: scope frames and qualified variable names
//! - [`errors`]: runtime error types
//!
//! # Execution Model
//!
//! No syntax tree is built. The interpreter reads the program text through a
//! cursor and executes it as it goes; loops and calls re-read text by seeking
//! the cursor back to bookmarks. A snapshot can be captured before every
//! statement for the inspector.

pub mod constants;
pub mod engine;
pub mod errors;
pub(crate) mod expressions;
pub(crate) mod loops;
pub mod methods;
pub mod scope;
pub(crate) mod statements;
