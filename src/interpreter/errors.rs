//! Runtime error types for the interpreter
//!
//! This module defines [`RuntimeError`], which represents every failure the
//! interpreter can report. Because source text is executed directly, syntax
//! errors surface at the moment the offending text is read, so there is a
//! single error type for lexing, evaluation and memory failures alike.
//!
//! All runtime errors are fatal - they halt execution and are reported with the
//! 1-based source line.

use crate::memory::value::VarType;
use crate::memory::MemoryError;
use crate::source::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// The cursor found something other than the expected token
    #[error("\"{found}\" given \"{expected}\" expected at line {}", .location.line)]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    /// A character that cannot start a statement
    #[error("unknown character \"{found}\" given at line {}", .location.line)]
    UnexpectedCharacter {
        found: char,
        location: SourceLocation,
    },

    /// Input ended before the outermost block was closed
    #[error("no ']' found at line {}", .location.line)]
    UnterminatedProgram { location: SourceLocation },

    /// A quoted literal was not closed on its line
    #[error("missing closing {quote} at line {}", .location.line)]
    UnterminatedLiteral {
        quote: char,
        location: SourceLocation,
    },

    /// Dangling operator, empty operand list or unbalanced parenthesis
    #[error("malformed expression: {message} at line {}", .location.line)]
    MalformedExpression {
        message: String,
        location: SourceLocation,
    },

    /// No `command start()` declaration
    #[error("no \"command start()\" found")]
    MissingStart,

    /// Reference to a variable that does not exist in the current scope
    #[error("variable \"{name}\" does not exist at line {}", .location.line)]
    UndeclaredVariable {
        name: String,
        location: SourceLocation,
    },

    /// Second declaration of the same qualified name
    #[error("duplicate variable \"{name}\" at line {}", .location.line)]
    DuplicateDeclaration {
        name: String,
        location: SourceLocation,
    },

    /// Operand or value of the wrong type
    #[error("\"{found}\" given \"{expected}\" expected at line {}", .location.line)]
    TypeMismatch {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    /// A non-numeric variable used inside arithmetic
    #[error("variable \"{name}\" of type {var_type} is not numeric at line {}", .location.line)]
    NonNumericOperand {
        name: String,
        var_type: VarType,
        location: SourceLocation,
    },

    /// `break` with no enclosing loop in the current method
    #[error("break must be in loop at line {}", .location.line)]
    BreakOutsideLoop { location: SourceLocation },

    /// A method with a return type finished without `give`
    #[error("no give statement in \"{method}\" at line {}", .location.line)]
    MissingReturn {
        method: String,
        location: SourceLocation,
    },

    /// A keyword, type name or `returnValue` used as a variable name
    #[error("\"{name}\" is a keyword at line {}", .location.line)]
    ReservedName {
        name: String,
        location: SourceLocation,
    },

    /// Call to a method that was never declared
    #[error("unknown method \"{name}\" at line {}", .location.line)]
    UnknownMethod {
        name: String,
        location: SourceLocation,
    },

    /// A name in type position that is not one of the five primitive types
    #[error("unknown type \"{name}\" at line {}", .location.line)]
    UnknownType {
        name: String,
        location: SourceLocation,
    },

    /// Two `command` declarations with the same name
    #[error("method \"{name}\" is declared twice at line {}", .location.line)]
    DuplicateMethod {
        name: String,
        location: SourceLocation,
    },

    /// Call site argument count differs from the declaration
    #[error("method \"{method}\" expects {expected} argument(s) at line {}", .location.line)]
    ArgumentCountMismatch {
        method: String,
        expected: usize,
        location: SourceLocation,
    },

    /// Too many nested method activations
    #[error("call depth limit of {limit} exceeded calling \"{method}\" at line {}", .location.line)]
    RecursionLimit {
        method: String,
        limit: usize,
        location: SourceLocation,
    },

    /// Division or modulo by zero
    #[error("{operation} by zero at line {}", .location.line)]
    DivisionByZero {
        operation: String,
        location: SourceLocation,
    },

    /// Integer arithmetic left the 32-bit range
    #[error("integer overflow in operation: {operation} at line {}", .location.line)]
    IntegerOverflow {
        operation: String,
        location: SourceLocation,
    },

    /// A numeric literal that cannot be read
    #[error("malformed number \"{text}\" at line {}", .location.line)]
    MalformedNumber {
        text: String,
        location: SourceLocation,
    },

    /// Memory region exhausted even after compaction
    #[error("out of memory: requested {requested} bits, capacity is {capacity} at line {}", .location.line)]
    OutOfMemory {
        requested: usize,
        capacity: usize,
        location: SourceLocation,
    },

    /// A value whose text does not fit its type's bit layout
    #[error("incorrect input data \"{value}\" for type {var_type} ({reason}) at line {}", .location.line)]
    InvalidEncoding {
        var_type: VarType,
        value: String,
        reason: String,
        location: SourceLocation,
    },

    /// Snapshot history limit exceeded
    #[error("snapshot memory limit exceeded: {current} bytes used, limit is {limit}")]
    SnapshotLimitExceeded { current: usize, limit: usize },

    /// Stepping past either end of the recorded history
    #[error("{message}")]
    HistoryUnavailable { message: String },
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::UnexpectedToken { location, .. }
            | RuntimeError::UnexpectedCharacter { location, .. }
            | RuntimeError::UnterminatedProgram { location }
            | RuntimeError::UnterminatedLiteral { location, .. }
            | RuntimeError::MalformedExpression { location, .. }
            | RuntimeError::UndeclaredVariable { location, .. }
            | RuntimeError::DuplicateDeclaration { location, .. }
            | RuntimeError::TypeMismatch { location, .. }
            | RuntimeError::NonNumericOperand { location, .. }
            | RuntimeError::BreakOutsideLoop { location }
            | RuntimeError::MissingReturn { location, .. }
            | RuntimeError::ReservedName { location, .. }
            | RuntimeError::UnknownMethod { location, .. }
            | RuntimeError::UnknownType { location, .. }
            | RuntimeError::DuplicateMethod { location, .. }
            | RuntimeError::ArgumentCountMismatch { location, .. }
            | RuntimeError::RecursionLimit { location, .. }
            | RuntimeError::DivisionByZero { location, .. }
            | RuntimeError::IntegerOverflow { location, .. }
            | RuntimeError::MalformedNumber { location, .. }
            | RuntimeError::OutOfMemory { location, .. }
            | RuntimeError::InvalidEncoding { location, .. } => Some(location),
            RuntimeError::MissingStart
            | RuntimeError::SnapshotLimitExceeded { .. }
            | RuntimeError::HistoryUnavailable { .. } => None,
        }
    }

    /// Builds an [`RuntimeError::UnexpectedToken`] from displayable parts.
    pub(crate) fn unexpected(
        expected: impl Into<String>,
        found: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        RuntimeError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            location,
        }
    }

    /// Attaches a source position to a memory engine failure.
    pub(crate) fn from_memory(err: MemoryError, location: SourceLocation) -> Self {
        match err {
            MemoryError::OutOfMemory {
                requested,
                capacity,
            } => RuntimeError::OutOfMemory {
                requested,
                capacity,
                location,
            },
            MemoryError::InvalidEncoding {
                var_type,
                value,
                reason,
            } => RuntimeError::InvalidEncoding {
                var_type,
                value,
                reason,
                location,
            },
            MemoryError::UnknownName { name } => RuntimeError::UndeclaredVariable { name, location },
        }
    }
}
