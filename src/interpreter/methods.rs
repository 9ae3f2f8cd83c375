//! Method declarations and the call protocol
//!
//! There is no call stack of return addresses. A call bookmarks the caller's
//! cursor, teleports to the declaration line to read the parameter list,
//! comes back to evaluate the arguments, then teleports into the body. When
//! the body ends (or a `give` stops it) the cursor is restored to just after
//! the call's closing parenthesis.
//!
//! Each activation gets a unique negative frame level; its parameters and
//! locals are stored as `<level>.<name>` and swept by prefix afterwards.

use crate::interpreter::constants::{ENTRY_METHOD, RETURN_VALUE};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{Value, VarType};
use crate::source::cursor::{is_blank, is_name_char};
use crate::source::SourceLocation;
use crate::stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

/// A pre-scanned `command` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// 0-based line of the declaration
    pub line: usize,
    /// Declared return type, `None` for `nothing`
    pub returns: Option<VarType>,
}

/// An actual argument, evaluated before any parameter is bound
enum Argument {
    Value(Value),
    /// Qualified name of a boolean variable passed by reference
    Alias(String),
}

/// Finds every `command` declaration and the line of `command start()`.
pub(crate) fn scan_methods(
    source: &str,
) -> Result<(FxHashMap<String, MethodDecl>, usize), RuntimeError> {
    let mut methods = FxHashMap::default();
    let mut start_line = None;

    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix("command") else {
            continue;
        };
        if !rest.starts_with(is_blank) {
            continue;
        }
        let column = line.len() - rest.len() + 1;
        let location = SourceLocation::new(index + 1, column);
        let rest = rest.trim_start();
        let name: String = rest.chars().take_while(|c| is_name_char(*c)).collect();
        if name.is_empty() {
            return Err(RuntimeError::unexpected("method name", rest, location));
        }

        if name == ENTRY_METHOD {
            if start_line.is_some() {
                return Err(RuntimeError::DuplicateMethod { name, location });
            }
            start_line = Some(index);
            continue;
        }

        let returns = scan_return_type(rest, location)?;
        if methods.contains_key(&name) {
            return Err(RuntimeError::DuplicateMethod { name, location });
        }
        methods.insert(
            name,
            MethodDecl {
                line: index,
                returns,
            },
        );
    }

    let start_line = start_line.ok_or(RuntimeError::MissingStart)?;
    Ok((methods, start_line))
}

/// Reads the `gives <type>` clause after the parameter list.
fn scan_return_type(
    declaration: &str,
    location: SourceLocation,
) -> Result<Option<VarType>, RuntimeError> {
    let after_params = declaration
        .find(')')
        .map(|i| declaration[i + 1..].trim_start())
        .unwrap_or_default();
    let Some(clause) = after_params.strip_prefix("gives") else {
        return Err(RuntimeError::unexpected("gives", after_params, location));
    };
    let type_name: String = clause
        .trim_start()
        .chars()
        .take_while(|c| is_name_char(*c))
        .collect();
    if type_name == "nothing" {
        return Ok(None);
    }
    VarType::from_keyword(&type_name)
        .map(Some)
        .ok_or(RuntimeError::UnknownType {
            name: type_name,
            location,
        })
}

impl Interpreter {
    /// Calls the method named at the cursor and returns the value it gave.
    ///
    /// The cursor ends just past the call's closing parenthesis.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn call_for_value(&mut self) -> Result<Option<Value>, RuntimeError> {
        let location = self.cursor.location();
        let name = self.cursor.read_name()?;
        let decl = self
            .methods
            .get(&name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownMethod {
                name: name.clone(),
                location,
            })?;
        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeError::RecursionLimit {
                method: name,
                limit: self.config.max_call_depth,
                location,
            });
        }
        tracing::debug!(method = %name, depth = self.call_depth, "calling method");

        let arguments_mark = self.cursor.bookmark();
        self.cursor.match_char('(', true)?;
        self.cursor.skip_past_close('(', ')', 1)?;

        // Formal parameters
        self.cursor.seek_line(decl.line);
        self.cursor.skip_white()?;
        self.cursor.match_keyword("command")?;
        self.cursor.read_name()?;
        self.cursor.match_char('(', true)?;
        let mut params: Vec<(VarType, String)> = Vec::new();
        while self.cursor.look() != ')' {
            let var_type = self.read_type()?;
            let param_location = self.cursor.location();
            let param = self.cursor.read_name()?;
            if param == RETURN_VALUE {
                return Err(RuntimeError::ReservedName {
                    name: param,
                    location: param_location,
                });
            }
            params.push((var_type, param));
            if self.cursor.look() == ',' {
                self.cursor.match_char(',', true)?;
            }
        }
        self.cursor.match_char(')', true)?;
        let body_mark = self.cursor.bookmark();

        // Actual arguments, in the caller's scope
        self.cursor.seek(arguments_mark);
        self.cursor.match_char('(', true)?;
        let arguments = self.read_arguments(&name, &params, location)?;
        let resume = self.cursor.bookmark();

        let level = self.scope.next_frame_level();
        for ((_, param), argument) in params.iter().zip(arguments) {
            match argument {
                Argument::Value(value) => {
                    self.scope
                        .bind_param(&mut self.ram, level, param, &value, location)?
                }
                Argument::Alias(target) => {
                    self.scope
                        .bind_alias(&mut self.ram, level, param, &target, location)?
                }
            }
        }

        self.cursor.seek(body_mark);
        self.cursor.match_keyword("gives")?;
        self.cursor.read_name()?;
        self.skip_trivia()?;

        let frame = self.scope.push_method_frame(&name);
        self.call_depth += 1;
        let value = ensure_sufficient_stack(|| self.run_method_body(&name, frame, decl.returns))?;
        self.call_depth -= 1;

        self.scope.pop_method_frame(frame);
        self.scope.sweep_frame(&mut self.ram, level, location)?;
        self.cursor.seek(resume);
        Ok(value)
    }

    /// Evaluates the call-site arguments against the parameter types.
    fn read_arguments(
        &mut self,
        method: &str,
        params: &[(VarType, String)],
        location: SourceLocation,
    ) -> Result<Vec<Argument>, RuntimeError> {
        let count_mismatch = || RuntimeError::ArgumentCountMismatch {
            method: method.to_string(),
            expected: params.len(),
            location,
        };

        let mut arguments = Vec::with_capacity(params.len());
        for (index, (var_type, _)) in params.iter().enumerate() {
            if self.cursor.look() == ')' {
                return Err(count_mismatch());
            }
            arguments.push(match self.boolean_reference(*var_type) {
                Some(target) => {
                    self.cursor.read_name()?;
                    Argument::Alias(target)
                }
                None => Argument::Value(self.get_value(*var_type)?),
            });
            if index + 1 < params.len() {
                if self.cursor.look() != ',' {
                    return Err(count_mismatch());
                }
                self.cursor.match_char(',', true)?;
            }
        }
        if self.cursor.look() != ')' {
            return Err(count_mismatch());
        }
        self.cursor.match_char(')', true)?;
        Ok(arguments)
    }

    /// For a boolean parameter whose argument is exactly the name of a
    /// boolean variable, the qualified name of that variable.
    fn boolean_reference(&self, var_type: VarType) -> Option<String> {
        if var_type != VarType::Boolean {
            return None;
        }
        let name = self.cursor.peek_name();
        if name.is_empty() {
            return None;
        }
        let next = self.cursor.rest_of_line()[name.chars().count()..]
            .iter()
            .find(|c| !is_blank(**c));
        if !matches!(next, Some(',') | Some(')')) {
            return None;
        }
        self.scope
            .find(&name)
            .filter(|(_, d)| d.var_type == VarType::Boolean)
            .map(|(qualified, _)| qualified)
    }

    /// Runs the body of an activation and reads the value it gives.
    fn run_method_body(
        &mut self,
        name: &str,
        frame: usize,
        returns: Option<VarType>,
    ) -> Result<Option<Value>, RuntimeError> {
        self.cursor.match_char('[', true)?;
        self.scope.enter_block();
        self.execute_block()?;

        let location = self.cursor.location();
        let gave = !self.scope.is_running(frame);
        let value = if !gave {
            if returns.is_some() {
                return Err(RuntimeError::MissingReturn {
                    method: name.to_string(),
                    location,
                });
            }
            self.cursor.match_char(']', true)?;
            None
        } else {
            self.cursor.match_keyword("give")?;
            match returns {
                None => None,
                Some(var_type) => {
                    let value = self.get_value(var_type)?;
                    self.scope
                        .store_return(&mut self.ram, name, &value, location)?;
                    let slot = format!("{}.{}", name, RETURN_VALUE);
                    Some(self.scope.read(&self.ram, &slot, location)?)
                }
            }
        };

        // Locals are swept with the activation's prefix
        self.scope.exit_block(&mut self.ram, false, location)?;
        Ok(value)
    }
}
