//! Run configuration

use crate::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_SNAPSHOT_LIMIT};
use crate::memory::DEFAULT_CAPACITY_BITS;

/// Settings for one interpreter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Size of the simulated memory region in bits
    pub memory_bits: usize,
    /// Nested method activations allowed before `RecursionLimit`
    pub max_call_depth: usize,
    /// Capture a snapshot before each statement
    pub record_history: bool,
    /// Estimated bytes of history allowed before `SnapshotLimitExceeded`
    pub snapshot_limit: usize,
    /// Mirror program output to stdout as it is produced
    pub echo_output: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            memory_bits: DEFAULT_CAPACITY_BITS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            record_history: false,
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
            echo_output: false,
        }
    }
}
