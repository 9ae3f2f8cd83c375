//! Loop statement execution (`while`, `for`, `do ... while`) and `break`.
//!
//! Loops are driven by cursor bookmarks: the condition (and for `for`, the
//! step clause and body) are re-read from the source on every iteration.
//! Each iteration runs its body in a fresh LOOP frame.
//!
//! `break` clears `running` on every frame up to the nearest LOOP and moves
//! the cursor past that loop's closing bracket, so the loop driver only has
//! to notice the stopped frame and return.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::scope::FrameKind;
use crate::memory::value::VarType;

impl Interpreter {
    /// Executes a `while (condition) [ body ]` loop.
    pub(crate) fn execute_while(&mut self) -> Result<(), RuntimeError> {
        self.cursor.match_keyword("while")?;
        let condition_mark = self.cursor.bookmark();
        loop {
            self.cursor.seek(condition_mark);
            if !self.condition()? {
                return self.skip_block();
            }
            if !self.run_block(FrameKind::Loop)? {
                return Ok(());
            }
            self.take_snapshot()?;
        }
    }

    /// Executes a `for (init; condition; step) [ body ]` loop.
    ///
    /// A typed init declares a temporary induction variable that is removed
    /// when the loop ends, whether normally or through `break`.
    pub(crate) fn execute_for(&mut self) -> Result<(), RuntimeError> {
        self.cursor.match_keyword("for")?;
        self.cursor.match_char('(', true)?;

        let location = self.cursor.location();
        let temporary = if VarType::from_keyword(&self.cursor.peek_name()).is_some() {
            let var_type = self.read_type()?;
            let name = self.cursor.read_name()?;
            self.cursor.match_char('=', true)?;
            let value = self.get_value(var_type)?;
            Some(self.scope.declare(&mut self.ram, &name, &value, location)?)
        } else {
            self.execute_assignment()?;
            None
        };
        self.cursor.match_char(';', true)?;

        let condition_mark = self.cursor.bookmark();
        let mut condition = self.boolean_expression()?;
        self.cursor.match_char(';', true)?;
        let step_mark = self.cursor.bookmark();
        self.cursor.skip_past_close('(', ')', 1)?;
        self.skip_trivia()?;
        let body_mark = self.cursor.bookmark();

        loop {
            self.cursor.seek(body_mark);
            if !condition {
                self.skip_block()?;
                break;
            }
            if !self.run_block(FrameKind::Loop)? {
                break;
            }
            let after_body = self.cursor.bookmark();

            self.take_snapshot()?;
            self.cursor.seek(step_mark);
            self.execute_assignment()?;
            self.cursor.seek(condition_mark);
            condition = self.boolean_expression()?;

            if !condition {
                self.cursor.seek(after_body);
                break;
            }
        }

        if let Some(name) = temporary {
            if !self.giving() {
                self.scope.remove(&mut self.ram, &name, location)?;
            }
        }
        Ok(())
    }

    /// Executes a `do [ body ] while (condition)` loop.
    pub(crate) fn execute_do_while(&mut self) -> Result<(), RuntimeError> {
        self.cursor.match_keyword("do")?;
        self.skip_trivia()?;
        let body_mark = self.cursor.bookmark();
        loop {
            self.cursor.seek(body_mark);
            let running = self.run_block(FrameKind::Loop)?;
            if !running && self.giving() {
                return Ok(());
            }

            self.skip_trivia()?;
            self.cursor.match_keyword("while")?;
            if !running {
                // Broken out of: the trailing condition is consumed, not evaluated
                self.cursor.match_char('(', true)?;
                return self.cursor.skip_past_close('(', ')', 1);
            }
            if !self.condition()? {
                return Ok(());
            }
            self.take_snapshot()?;
        }
    }

    pub(crate) fn execute_break(&mut self) -> Result<(), RuntimeError> {
        let location = self.cursor.location();
        self.cursor.match_keyword("break")?;
        let span = self
            .scope
            .break_span()
            .ok_or(RuntimeError::BreakOutsideLoop { location })?;
        self.scope.stop_frames(span);
        self.cursor.skip_past_close('[', ']', span)
    }
}
