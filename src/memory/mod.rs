//! Simulated memory for the interpreter
//!
//! This module provides the storage abstractions behind every variable:
//! - [`value`]: the primitive types and decoded runtime values
//! - [`encoding`]: bit layouts of each type
//! - [`ram`]: the bit-addressable region with named buckets, bump allocation
//!   and compaction
//!
//! # Addressing
//!
//! There are no addresses in the language. Storage is addressed only by
//! qualified variable names; two names may share one bucket (boolean
//! parameters passed by reference).

pub mod encoding;
pub mod ram;
pub mod value;

use thiserror::Error;
use value::VarType;

/// Default size of the memory region in bits
pub const DEFAULT_CAPACITY_BITS: usize = 800_000;

/// Failures reported by the memory engine
///
/// These carry no source position; the interpreter attaches one when it
/// converts them into a [`RuntimeError`](crate::interpreter::errors::RuntimeError).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MemoryError {
    #[error("out of memory: requested {requested} bits, capacity is {capacity}")]
    OutOfMemory { requested: usize, capacity: usize },

    #[error("incorrect input data \"{value}\" for type {var_type} ({reason})")]
    InvalidEncoding {
        var_type: VarType,
        value: String,
        reason: String,
    },

    #[error("no storage named \"{name}\"")]
    UnknownName { name: String },
}
