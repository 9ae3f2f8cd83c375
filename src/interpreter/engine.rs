// Execution engine for the interpreter

use crate::config::InterpreterConfig;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::methods::{scan_methods, MethodDecl};
use crate::interpreter::scope::{Scope, VariableDescriptor};
use crate::memory::ram::Ram;
use crate::memory::value::VarType;
use crate::snapshot::{
    BucketView, FrameView, MockTerminal, Snapshot, SnapshotManager, VariableView,
};
use crate::source::{Cursor, EOF};
use rustc_hash::FxHashMap;

/// The main interpreter that executes a program straight from its text
pub struct Interpreter {
    /// Read position in the program text
    pub(crate) cursor: Cursor,

    /// Scope frames and the variable table
    pub(crate) scope: Scope,

    /// Simulated memory backing every variable
    pub(crate) ram: Ram,

    /// Method declarations found by the pre-scan
    pub(crate) methods: FxHashMap<String, MethodDecl>,

    pub(crate) config: InterpreterConfig,

    /// 0-based line of `command start()`
    start_line: usize,

    /// Mock terminal for program output
    terminal: MockTerminal,

    /// Snapshot manager for time-travel inspection
    snapshot_manager: SnapshotManager,

    /// Current position in execution history
    history_position: usize,

    /// Number of active method activations
    pub(crate) call_depth: usize,

    /// Set by a `give` in the entry routine
    pub(crate) halted: bool,

    /// Whether execution has finished
    finished: bool,
}

impl Interpreter {
    /// Loads the program lines and pre-scans method declarations.
    pub fn new(source: &str, config: InterpreterConfig) -> Result<Self, RuntimeError> {
        let (methods, start_line) = scan_methods(source)?;
        tracing::debug!(methods = methods.len(), start_line, "scanned program");

        let terminal = if config.echo_output {
            MockTerminal::echoing()
        } else {
            MockTerminal::new()
        };

        Ok(Interpreter {
            cursor: Cursor::new(source),
            scope: Scope::new(),
            ram: Ram::new(config.memory_bits),
            methods,
            start_line,
            terminal,
            snapshot_manager: SnapshotManager::new(config.snapshot_limit),
            history_position: 0,
            call_depth: 0,
            halted: false,
            finished: false,
            config,
        })
    }

    /// Run the program from start to finish
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        self.skip_trivia()?;
        self.cursor.match_keyword("program")?;
        self.cursor.match_char('[', true)?;
        self.declare_universals()?;

        self.cursor.match_keyword("command")?;
        self.cursor.match_keyword("start")?;
        self.cursor.match_char('(', true)?;
        self.cursor.match_char(')', true)?;
        self.skip_trivia()?;
        self.cursor.match_char('[', true)?;

        self.scope.enter_block();
        self.execute_block()?;
        if !self.halted {
            let location = self.cursor.location();
            self.cursor.match_char(']', true)?;
            self.scope.exit_block(&mut self.ram, true, location)?;
        }

        self.finished = true;
        self.take_snapshot()?;
        tracing::debug!(
            snapshots = self.snapshot_manager.len(),
            high_water = self.ram.high_water(),
            "program finished"
        );
        Ok(())
    }

    /// Top-level declarations between `program [` and `command start()`.
    fn declare_universals(&mut self) -> Result<(), RuntimeError> {
        loop {
            self.skip_trivia()?;
            if self.cursor.line() >= self.start_line || self.cursor.is_at_end() {
                return Ok(());
            }
            self.take_snapshot()?;
            let var_type = self.read_type()?;
            loop {
                let location = self.cursor.location();
                let name = self.cursor.read_name()?;
                self.cursor.match_char('=', true)?;
                let value = self.get_value(var_type)?;
                self.scope
                    .declare_universal(&mut self.ram, &name, &value, location)?;
                if self.cursor.look() != ',' {
                    break;
                }
                self.cursor.match_char(',', true)?;
            }
        }
    }

    /// Reads a type keyword.
    pub(crate) fn read_type(&mut self) -> Result<VarType, RuntimeError> {
        let location = self.cursor.location();
        let name = self.cursor.read_name()?;
        VarType::from_keyword(&name).ok_or(RuntimeError::UnknownType { name, location })
    }

    /// Skips blanks and `//` comments.
    pub(crate) fn skip_trivia(&mut self) -> Result<(), RuntimeError> {
        loop {
            self.cursor.skip_white()?;
            if self.cursor.is_matching("//") {
                self.cursor.skip_line();
            } else {
                return Ok(());
            }
        }
    }

    /// Executes statements until the closing `]` of the current block, or
    /// until an early exit stops the innermost frame.
    pub(crate) fn execute_block(&mut self) -> Result<(), RuntimeError> {
        loop {
            if self.halted || !self.scope.top_running() {
                return Ok(());
            }
            self.skip_trivia()?;
            match self.cursor.look() {
                ']' => return Ok(()),
                EOF => {
                    return Err(RuntimeError::UnterminatedProgram {
                        location: self.cursor.location(),
                    })
                }
                _ => self.execute_statement()?,
            }
        }
    }

    /// Dispatches one statement on the upcoming word.
    fn execute_statement(&mut self) -> Result<(), RuntimeError> {
        self.take_snapshot()?;
        let word = self.cursor.peek_name();
        match word.as_str() {
            "output" => self.execute_output(false),
            "outputNL" => self.execute_output(true),
            "if" => self.execute_if(),
            "while" => self.execute_while(),
            "for" => self.execute_for(),
            "do" => self.execute_do_while(),
            "break" => self.execute_break(),
            "give" => self.execute_give(),
            "" => Err(RuntimeError::UnexpectedCharacter {
                found: self.cursor.look(),
                location: self.cursor.location(),
            }),
            _ if VarType::from_keyword(&word).is_some() => self.execute_declaration(),
            _ if self.call_ahead() => self.call_for_value().map(|_| ()),
            // A method named without its argument list is not a call
            _ if self.methods.contains_key(&word) && self.scope.find(&word).is_none() => {
                Err(RuntimeError::UnknownMethod {
                    name: word.clone(),
                    location: self.cursor.location(),
                })
            }
            _ => self.execute_assignment(),
        }
    }

    /// Whether a `give` is unwinding the current method (or ended the program)
    pub(crate) fn giving(&self) -> bool {
        self.halted || !self.scope.current_method().running
    }

    // ========== Snapshots ==========

    /// Record the current state into history when recording is enabled
    pub(crate) fn take_snapshot(&mut self) -> Result<(), RuntimeError> {
        if !self.config.record_history {
            return Ok(());
        }

        let snapshot = self.capture();
        self.snapshot_manager
            .push(snapshot)
            .map_err(|current| {
                tracing::warn!(
                    limit = self.snapshot_manager.memory_limit(),
                    "snapshot limit exceeded"
                );
                RuntimeError::SnapshotLimitExceeded {
                    current,
                    limit: self.snapshot_manager.memory_limit(),
                }
            })?;

        self.history_position = self.snapshot_manager.len() - 1;
        Ok(())
    }

    fn capture(&self) -> Snapshot {
        let mut variables: Vec<VariableView> = self
            .scope
            .variables()
            .iter()
            .map(|(name, VariableDescriptor { depth, var_type })| VariableView {
                name: name.clone(),
                var_type: *var_type,
                depth: *depth,
                value: self
                    .ram
                    .read(name)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            })
            .collect();
        variables.sort_by(|a, b| a.name.cmp(&b.name));

        let buckets = self
            .ram
            .live_buckets()
            .into_iter()
            .map(|(names, bucket)| BucketView {
                names,
                var_type: bucket.var_type,
                start: bucket.start,
                width: bucket.width,
                split: bucket.split,
                bits: self
                    .ram
                    .bits_of(bucket)
                    .iter()
                    .map(|b| if *b { '1' } else { '0' })
                    .collect(),
            })
            .collect();

        Snapshot {
            location: self.cursor.location(),
            variables,
            frames: self.scope.frames().iter().map(FrameView::from).collect(),
            buckets,
            high_water: self.ram.high_water(),
            capacity: self.ram.capacity(),
            output_len: self.terminal.len(),
            call_depth: self.call_depth,
        }
    }

    /// Step backward in history
    pub fn step_backward(&mut self) -> Result<(), RuntimeError> {
        if self.history_position == 0 {
            return Err(RuntimeError::HistoryUnavailable {
                message: "Already at the beginning of execution".to_string(),
            });
        }
        self.history_position -= 1;
        Ok(())
    }

    /// Step forward in history
    pub fn step_forward(&mut self) -> Result<(), RuntimeError> {
        if self.history_position + 1 >= self.snapshot_manager.len() {
            return Err(RuntimeError::HistoryUnavailable {
                message: "No more snapshots available (execution finished)".to_string(),
            });
        }
        self.history_position += 1;
        Ok(())
    }

    /// Rewind to the beginning of execution history
    pub fn rewind_to_start(&mut self) -> Result<(), RuntimeError> {
        if self.snapshot_manager.is_empty() {
            return Err(RuntimeError::HistoryUnavailable {
                message: "No snapshots available".to_string(),
            });
        }
        self.history_position = 0;
        Ok(())
    }

    /// Jump to the last recorded snapshot
    pub fn seek_to_end(&mut self) {
        self.history_position = self.snapshot_manager.len().saturating_sub(1);
    }

    // ========== Getter methods for UI and tests ==========

    /// Get a reference to the terminal output
    pub fn terminal(&self) -> &MockTerminal {
        &self.terminal
    }

    pub(crate) fn terminal_mut(&mut self) -> &mut MockTerminal {
        &mut self.terminal
    }

    /// Get a reference to the simulated memory
    pub fn memory(&self) -> &Ram {
        &self.ram
    }

    /// Get the live variable table
    pub fn variables(&self) -> &FxHashMap<String, VariableDescriptor> {
        self.scope.variables()
    }

    /// Get the scope-frame stack
    pub fn frames(&self) -> &[crate::interpreter::scope::ScopeFrame] {
        self.scope.frames()
    }

    /// Get the pre-scanned method declarations
    pub fn methods(&self) -> &FxHashMap<String, MethodDecl> {
        &self.methods
    }

    /// Get the current history position
    pub fn history_position(&self) -> usize {
        self.history_position
    }

    /// Get the total number of snapshots
    pub fn total_snapshots(&self) -> usize {
        self.snapshot_manager.len()
    }

    /// The snapshot at the current history position
    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.snapshot_manager.get(self.history_position)
    }

    /// Check if execution has finished
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
