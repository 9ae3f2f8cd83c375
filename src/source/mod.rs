//! Program text and the character cursor that reads it
//!
//! There is no token stream: the interpreter consumes source one lookahead
//! character at a time through a [`Cursor`], and loops and method calls are
//! built on saving and restoring cursor [`Bookmark`]s.

pub mod cursor;

pub use cursor::{Bookmark, Cursor, EOF};

/// A 1-based position in the program text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}
