// Output capture and execution history

use crate::interpreter::scope::{FrameKind, ScopeFrame};
use crate::memory::value::VarType;
use crate::source::SourceLocation;
use std::io::Write;

/// Mock terminal capturing `output`/`outputNL` text
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    buffer: String,
    echo: bool,
}

impl MockTerminal {
    pub fn new() -> Self {
        MockTerminal::default()
    }

    /// A terminal that also writes everything it receives to stdout
    pub fn echoing() -> Self {
        MockTerminal {
            buffer: String::new(),
            echo: true,
        }
    }

    pub fn print(&mut self, text: &str) {
        self.buffer.push_str(text);
        if self.echo {
            let mut stdout = std::io::stdout().lock();
            // Output is best effort once the program text has been captured
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }

    /// Everything printed so far
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get all lines as a vector of strings
    pub fn get_output(&self) -> Vec<String> {
        split_lines(&self.buffer)
    }
}

/// Splits printed text into lines, dropping the empty tail after a final newline.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(|s| s.to_string()).collect();
    if lines.last().is_some_and(|s| s.is_empty()) {
        lines.pop();
    }
    lines
}

/// A live variable as seen at one point of execution
#[derive(Debug, Clone, PartialEq)]
pub struct VariableView {
    pub name: String,
    pub var_type: VarType,
    pub depth: i64,
    pub value: String,
}

/// A live memory bucket with its raw bits
#[derive(Debug, Clone, PartialEq)]
pub struct BucketView {
    pub names: Vec<String>,
    pub var_type: VarType,
    pub start: usize,
    pub width: usize,
    pub split: Option<usize>,
    /// `0`/`1` rendering of the bucket's bits
    pub bits: String,
}

/// A scope frame as seen at one point of execution
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub kind: FrameKind,
    pub running: bool,
    pub method: Option<String>,
    pub level: i64,
}

impl From<&ScopeFrame> for FrameView {
    fn from(frame: &ScopeFrame) -> Self {
        FrameView {
            kind: frame.kind,
            running: frame.running,
            method: frame.method.clone(),
            level: frame.level,
        }
    }
}

/// Snapshot of execution state, captured before each statement
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub location: SourceLocation,
    pub variables: Vec<VariableView>,
    pub frames: Vec<FrameView>,
    pub buckets: Vec<BucketView>,
    pub high_water: usize,
    pub capacity: usize,
    /// Bytes of terminal output produced so far
    pub output_len: usize,
    pub call_depth: usize,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        // Rough: string payloads plus a fixed overhead per entry
        let variables: usize = self
            .variables
            .iter()
            .map(|v| v.name.len() + v.value.len() + 48)
            .sum();
        let buckets: usize = self
            .buckets
            .iter()
            .map(|b| b.bits.len() + b.names.iter().map(String::len).sum::<usize>() + 64)
            .sum();
        let frames = self.frames.len() * 48;
        variables + buckets + frames + std::mem::size_of::<Snapshot>()
    }
}

/// Manages execution history
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history, refusing it once the limit would be passed
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), usize> {
        let snapshot_size = snapshot.estimated_size();
        if self.current_memory + snapshot_size > self.max_memory {
            return Err(self.current_memory + snapshot_size);
        }
        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            location: SourceLocation::new(1, 1),
            variables: Vec::new(),
            frames: Vec::new(),
            buckets: Vec::new(),
            high_water: 0,
            capacity: 0,
            output_len: 0,
            call_depth: 0,
        }
    }

    #[test]
    fn test_get_output_splits_lines() {
        let mut terminal = MockTerminal::new();
        terminal.print("a");
        terminal.print("b\n");
        terminal.print("c\n");
        assert_eq!(terminal.get_output(), vec!["ab", "c"]);
    }

    #[test]
    fn test_manager_enforces_limit() {
        let size = empty_snapshot().estimated_size();
        let mut manager = SnapshotManager::new(size * 2);
        assert!(manager.push(empty_snapshot()).is_ok());
        assert!(manager.push(empty_snapshot()).is_ok());
        assert!(manager.push(empty_snapshot()).is_err());
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.memory_usage(), size * 2);
    }
}
