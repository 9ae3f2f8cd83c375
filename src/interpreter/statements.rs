//! Statement execution implementation
//!
//! This module handles the straight-line statements and conditionals:
//!
//! - `output` / `outputNL`
//! - Declarations (`integer a = 1, b = 2`) and reassignment
//! - `if` / `else if` / `else`
//! - `give`
//!
//! # Implementation
//!
//! All statement execution methods are implemented as `pub(crate)` methods
//! on the [`Interpreter`] struct. Each reads its own text through the cursor;
//! untaken branches are skipped by bracket counting and never evaluated.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::scope::FrameKind;

impl Interpreter {
    pub(crate) fn execute_output(&mut self, newline: bool) -> Result<(), RuntimeError> {
        self.cursor
            .match_keyword(if newline { "outputNL" } else { "output" })?;
        let mut text = self.output_text()?;
        if newline {
            text.push('\n');
        }
        self.terminal_mut().print(&text);
        Ok(())
    }

    /// `type name = value (, name = value)*`
    pub(crate) fn execute_declaration(&mut self) -> Result<(), RuntimeError> {
        let var_type = self.read_type()?;
        loop {
            let location = self.cursor.location();
            let name = self.cursor.read_name()?;
            self.cursor.match_char('=', true)?;
            let value = self.get_value(var_type)?;
            self.scope.declare(&mut self.ram, &name, &value, location)?;
            if self.cursor.look() != ',' {
                return Ok(());
            }
            self.cursor.match_char(',', true)?;
        }
    }

    /// `name = value` for an existing variable
    pub(crate) fn execute_assignment(&mut self) -> Result<(), RuntimeError> {
        let location = self.cursor.location();
        let name = self.cursor.read_name()?;
        let (qualified, descriptor) = self.scope.lookup(&name, location)?;
        self.cursor.match_char('=', true)?;
        let value = self.get_value(descriptor.var_type)?;
        self.scope.assign(&mut self.ram, &qualified, &value, location)
    }

    /// Runs a bracketed block inside a new frame of `kind`.
    ///
    /// Returns whether the frame was still running at the end; when it was
    /// not, the closing bracket is left for the early exit to deal with.
    pub(crate) fn run_block(&mut self, kind: FrameKind) -> Result<bool, RuntimeError> {
        self.cursor.match_char('[', true)?;
        let frame = self.scope.push_frame(kind);
        self.scope.enter_block();
        self.execute_block()?;

        let location = self.cursor.location();
        let running = self.scope.is_running(frame) && !self.halted;
        if running {
            self.cursor.match_char(']', true)?;
        }
        let sweep = !self.giving();
        self.scope.exit_block(&mut self.ram, sweep, location)?;
        self.scope.pop_to(frame);
        Ok(running)
    }

    /// Skips a bracketed block without executing it.
    pub(crate) fn skip_block(&mut self) -> Result<(), RuntimeError> {
        self.skip_trivia()?;
        self.cursor.match_char('[', true)?;
        self.cursor.skip_past_close('[', ']', 1)?;
        self.skip_trivia()
    }

    /// Reads `(condition)` and the blanks after it.
    pub(crate) fn condition(&mut self) -> Result<bool, RuntimeError> {
        self.cursor.match_char('(', true)?;
        let value = self.boolean_expression()?;
        self.cursor.match_char(')', true)?;
        self.skip_trivia()?;
        Ok(value)
    }

    pub(crate) fn execute_if(&mut self) -> Result<(), RuntimeError> {
        self.cursor.match_keyword("if")?;
        if self.condition()? {
            if self.run_block(FrameKind::IfElse)? {
                self.skip_trivia()?;
                self.skip_else_chain()?;
            }
            return Ok(());
        }

        self.skip_block()?;
        if self.cursor.peek_name() != "else" {
            return Ok(());
        }
        self.cursor.match_keyword("else")?;
        if self.cursor.peek_name() == "if" {
            return self.execute_if();
        }
        self.skip_trivia()?;
        self.run_block(FrameKind::IfElse).map(|_| ())
    }

    /// Skips every `else if (...) [...]` and `else [...]` after a taken branch.
    fn skip_else_chain(&mut self) -> Result<(), RuntimeError> {
        while self.cursor.peek_name() == "else" {
            self.cursor.match_keyword("else")?;
            let chained = self.cursor.peek_name() == "if";
            if chained {
                self.cursor.match_keyword("if")?;
                self.cursor.match_char('(', true)?;
                self.cursor.skip_past_close('(', ')', 1)?;
            }
            self.skip_block()?;
            if !chained {
                break;
            }
        }
        Ok(())
    }

    /// `give` ends the program from the entry routine; inside a method it
    /// stops every frame of the activation and leaves the cursor on `give`
    /// for the call machinery to read the value.
    pub(crate) fn execute_give(&mut self) -> Result<(), RuntimeError> {
        if self.scope.in_entry_routine() {
            self.cursor.match_keyword("give")?;
            tracing::debug!(line = self.cursor.location().line, "program halted by give");
            self.halted = true;
            return Ok(());
        }
        self.scope.stop_method();
        Ok(())
    }
}
