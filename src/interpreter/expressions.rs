//! Expression evaluation implementation
//!
//! This module evaluates expressions straight from the source cursor:
//!
//! - Arithmetic: infix to postfix over `+ - * / %`, parentheses and unary
//!   minus, with operands resolved while the postfix stream is built
//! - Boolean: `|`, `&`, stackable `!`, parenthesized groups, relations
//!   between numeric expressions and equality between chars, words or
//!   booleans
//! - Typed value readers used by declarations, assignments and arguments
//!
//! An expression never continues onto the next line. It ends at the first
//! character that cannot extend it, so `outputNL i i = i + 1` prints `i` and
//! leaves the cursor on the second `i`.
//!
//! # Safety
//!
//! Integer arithmetic is checked: overflow and division by zero are runtime
//! errors rather than panics or wrapped results.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{format_double, Value, VarType};
use crate::source::cursor::{is_blank, is_name_char};
use crate::source::{SourceLocation, EOF};

/// An entry of the operator stack
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operator {
    Binary(char),
    Negate,
    OpenParen,
}

impl Operator {
    fn rank(self) -> i32 {
        match self {
            Operator::Binary('*' | '/' | '%') => 2,
            Operator::Binary(_) => 1,
            Operator::Negate => 3,
            Operator::OpenParen => -1,
        }
    }
}

/// An entry of the postfix stream
#[derive(Debug, Clone, PartialEq)]
enum Postfix {
    Operand(Value),
    Binary(char),
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Relation {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    fn holds(self, a: f64, b: f64) -> bool {
        match self {
            Relation::Eq => a == b,
            Relation::Ne => a != b,
            Relation::Lt => a < b,
            Relation::Le => a <= b,
            Relation::Gt => a > b,
            Relation::Ge => a >= b,
        }
    }
}

fn is_binary_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '%')
}

/// Index just past a quoted literal starting at `chars[start]`.
fn skip_quoted(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() && chars[i] != quote {
        if quote == '\'' && chars[i] == '\\' {
            i += 1;
        }
        i += 1;
    }
    i + 1
}

/// Index just past the parenthesized group opening at `chars[start]`.
fn skip_group(chars: &[char], start: usize) -> usize {
    let mut depth = 0;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            '"' | '\'' => {
                i = skip_quoted(chars, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    i
}

/// Scans the extent of the expression at the start of `chars` and reports
/// whether it is a boolean expression. Nothing is evaluated.
///
/// The scan stops where the expression would: at an operand directly
/// following an operand, an unbalanced `)`, or any character that cannot
/// continue it.
pub(crate) fn looks_boolean(chars: &[char]) -> bool {
    let mut i = 0;
    let mut depth = 0;
    let mut after_operand = false;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '<' | '>' | '=' | '!' | '&' | '|' => return true,
            '"' | '\'' => {
                if after_operand {
                    return false;
                }
                i = skip_quoted(chars, i);
                after_operand = true;
            }
            '(' => {
                if after_operand {
                    return false;
                }
                depth += 1;
                i += 1;
            }
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                after_operand = true;
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => return false,
            c if is_binary_operator(c) => {
                after_operand = false;
                i += 1;
            }
            c if is_name_char(c) || c == '.' => {
                if after_operand {
                    return false;
                }
                let start = i;
                while i < chars.len() && (is_name_char(chars[i]) || chars[i] == '.') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if word == "true" || word == "false" {
                    return true;
                }
                let mut j = i;
                while j < chars.len() && is_blank(chars[j]) {
                    j += 1;
                }
                if c.is_ascii_alphabetic() && chars.get(j) == Some(&'(') {
                    i = skip_group(chars, j);
                }
                after_operand = true;
            }
            _ => return false,
        }
    }
    false
}

impl Interpreter {
    /// Whether the name at the cursor is followed by `(`.
    pub(crate) fn call_ahead(&self) -> bool {
        let name_len = self.cursor.peek_name().chars().count();
        if name_len == 0 {
            return false;
        }
        self.cursor.rest_of_line()[name_len..]
            .iter()
            .find(|c| !is_blank(**c))
            == Some(&'(')
    }

    fn malformed(&self, message: &str) -> RuntimeError {
        RuntimeError::MalformedExpression {
            message: message.to_string(),
            location: self.cursor.location(),
        }
    }

    // ========== Arithmetic ==========

    /// Evaluates an arithmetic expression on the current line.
    pub(crate) fn arithmetic(&mut self) -> Result<Value, RuntimeError> {
        let location = self.cursor.location();
        let line = self.cursor.line();
        let mut output: Vec<Postfix> = Vec::new();
        let mut operators: Vec<Operator> = Vec::new();
        let mut expect_operand = true;
        let mut open_parens = 0usize;

        while self.cursor.line() == line {
            let c = self.cursor.look();
            if expect_operand {
                match c {
                    '(' => {
                        operators.push(Operator::OpenParen);
                        open_parens += 1;
                        self.cursor.match_char('(', true)?;
                    }
                    '-' => {
                        operators.push(Operator::Negate);
                        self.cursor.match_char('-', true)?;
                    }
                    c if c.is_ascii_digit() || c == '.' => {
                        output.push(Postfix::Operand(self.read_number()?));
                        expect_operand = false;
                    }
                    c if c.is_ascii_alphabetic() => {
                        output.push(Postfix::Operand(self.numeric_operand()?));
                        expect_operand = false;
                    }
                    _ => break,
                }
            } else {
                match c {
                    c if is_binary_operator(c) => {
                        if c == '/' && self.cursor.peek_char(1) == '/' {
                            break;
                        }
                        let incoming = Operator::Binary(c);
                        while let Some(&top) = operators.last() {
                            if top != Operator::OpenParen && top.rank() >= incoming.rank() {
                                output.push(Self::postfix_of(top));
                                operators.pop();
                            } else {
                                break;
                            }
                        }
                        operators.push(incoming);
                        self.cursor.match_char(c, true)?;
                        expect_operand = true;
                    }
                    ')' if open_parens > 0 => {
                        while let Some(top) = operators.pop() {
                            if top == Operator::OpenParen {
                                break;
                            }
                            output.push(Self::postfix_of(top));
                        }
                        open_parens -= 1;
                        self.cursor.match_char(')', true)?;
                    }
                    _ => break,
                }
            }
        }

        if expect_operand {
            return Err(if output.is_empty() && operators.is_empty() {
                self.malformed("empty expression")
            } else {
                self.malformed("dangling operator")
            });
        }
        if open_parens > 0 {
            return Err(self.malformed("missing ')'"));
        }
        while let Some(top) = operators.pop() {
            output.push(Self::postfix_of(top));
        }
        self.evaluate_postfix(output, location)
    }

    fn postfix_of(op: Operator) -> Postfix {
        match op {
            Operator::Binary(c) => Postfix::Binary(c),
            _ => Postfix::Negate,
        }
    }

    /// Errors are reported at `location`, where the expression starts.
    fn evaluate_postfix(
        &self,
        postfix: Vec<Postfix>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let mut stack: Vec<Value> = Vec::new();
        for item in postfix {
            match item {
                Postfix::Operand(value) => stack.push(value),
                Postfix::Negate => {
                    let value = stack.pop().ok_or_else(|| self.malformed("missing operand"))?;
                    stack.push(Self::negate(value, location)?);
                }
                Postfix::Binary(op) => {
                    let b = stack.pop().ok_or_else(|| self.malformed("missing operand"))?;
                    let a = stack.pop().ok_or_else(|| self.malformed("missing operand"))?;
                    stack.push(Self::apply_binary(op, a, b, location)?);
                }
            }
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(self.malformed("unbalanced operands")),
        }
    }

    #[inline]
    fn negate(value: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
        match value {
            Value::Integer(n) => n
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: format!("-{}", n),
                    location,
                }),
            Value::Double(d) => Ok(Value::Double(-d)),
            other => Err(RuntimeError::TypeMismatch {
                expected: "integer or double".to_string(),
                found: other.var_type().to_string(),
                location,
            }),
        }
    }

    #[inline]
    fn apply_binary(
        op: char,
        a: Value,
        b: Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let division_by_zero = || RuntimeError::DivisionByZero {
            operation: if op == '%' { "modulo" } else { "division" }.to_string(),
            location,
        };

        if let (Value::Integer(x), Value::Integer(y)) = (&a, &b) {
            let (x, y) = (*x, *y);
            if (op == '/' || op == '%') && y == 0 {
                return Err(division_by_zero());
            }
            let result = match op {
                '+' => x.checked_add(y),
                '-' => x.checked_sub(y),
                '*' => x.checked_mul(y),
                '/' => x.checked_div(y),
                _ => x.checked_rem(y),
            };
            return result
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: format!("{} {} {}", x, op, y),
                    location,
                });
        }

        let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
            return Err(RuntimeError::TypeMismatch {
                expected: "integer or double".to_string(),
                found: a.var_type().to_string(),
                location,
            });
        };
        if (op == '/' || op == '%') && y == 0.0 {
            return Err(division_by_zero());
        }
        Ok(Value::Double(match op {
            '+' => x + y,
            '-' => x - y,
            '*' => x * y,
            '/' => x / y,
            _ => x % y,
        }))
    }

    /// Reads a numeric literal; a `.` makes it a double.
    fn read_number(&mut self) -> Result<Value, RuntimeError> {
        let location = self.cursor.location();
        let line = self.cursor.line();
        let mut text = String::new();
        while self.cursor.line() == line
            && (self.cursor.look().is_ascii_digit() || self.cursor.look() == '.')
        {
            text.push(self.cursor.look());
            self.cursor.advance()?;
        }
        self.cursor.skip_white()?;

        let malformed = || RuntimeError::MalformedNumber {
            text: text.clone(),
            location,
        };
        if text.contains('.') {
            text.parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(Value::Double)
                .ok_or_else(malformed)
        } else {
            text.parse::<i32>().map(Value::Integer).map_err(|_| malformed())
        }
    }

    /// A named operand inside arithmetic: a numeric variable or method call.
    fn numeric_operand(&mut self) -> Result<Value, RuntimeError> {
        let location = self.cursor.location();
        if self.call_ahead() {
            let name = self.cursor.peek_name();
            let value = self.call_for_value()?;
            return match value {
                Some(v) if v.var_type().is_numeric() => Ok(v),
                Some(v) => Err(RuntimeError::TypeMismatch {
                    expected: "integer or double".to_string(),
                    found: v.var_type().to_string(),
                    location,
                }),
                None => Err(RuntimeError::TypeMismatch {
                    expected: "integer or double".to_string(),
                    found: format!("nothing from \"{}\"", name),
                    location,
                }),
            };
        }

        let name = self.cursor.read_name()?;
        let (qualified, descriptor) = self.scope.lookup(&name, location)?;
        if !descriptor.var_type.is_numeric() {
            return Err(RuntimeError::NonNumericOperand {
                name,
                var_type: descriptor.var_type,
                location,
            });
        }
        self.scope.read(&self.ram, &qualified, location)
    }

    // ========== Typed values ==========

    /// Reads a value of the given declared type at the cursor.
    pub(crate) fn get_value(&mut self, var_type: VarType) -> Result<Value, RuntimeError> {
        let location = self.cursor.location();
        match var_type {
            VarType::Integer => match self.arithmetic()? {
                Value::Double(d) => {
                    if d.fract() == 0.0 && d >= f64::from(i32::MIN) && d <= f64::from(i32::MAX) {
                        Ok(Value::Integer(d as i32))
                    } else {
                        Err(RuntimeError::TypeMismatch {
                            expected: "integer".to_string(),
                            found: format_double(d),
                            location,
                        })
                    }
                }
                other => Ok(other),
            },
            VarType::Double => {
                let value = self.arithmetic()?;
                Ok(Value::Double(value.as_f64().unwrap_or_default()))
            }
            VarType::Char | VarType::Word => {
                let value = self.text_operand()?;
                if value.var_type() != var_type {
                    return Err(RuntimeError::TypeMismatch {
                        expected: var_type.to_string(),
                        found: value.var_type().to_string(),
                        location,
                    });
                }
                Ok(value)
            }
            VarType::Boolean => Ok(Value::Boolean(self.boolean_expression()?)),
        }
    }

    /// A quoted literal, or a variable or method call of any type.
    fn text_operand(&mut self) -> Result<Value, RuntimeError> {
        let location = self.cursor.location();
        match self.cursor.look() {
            '\'' => self.char_literal(),
            '"' => self.word_literal(),
            c if c.is_ascii_alphabetic() => {
                if self.call_ahead() {
                    let name = self.cursor.peek_name();
                    return self.call_for_value()?.ok_or_else(|| RuntimeError::TypeMismatch {
                        expected: "a value".to_string(),
                        found: format!("nothing from \"{}\"", name),
                        location,
                    });
                }
                let name = self.cursor.read_name()?;
                let (qualified, _) = self.scope.lookup(&name, location)?;
                self.scope.read(&self.ram, &qualified, location)
            }
            _ => Err(RuntimeError::unexpected(
                "character or word",
                self.cursor.describe_look(),
                location,
            )),
        }
    }

    /// `'c'`, where `\` takes the following character literally.
    pub(crate) fn char_literal(&mut self) -> Result<Value, RuntimeError> {
        let location = self.cursor.location();
        let line = self.cursor.line();
        let unterminated = RuntimeError::UnterminatedLiteral {
            quote: '\'',
            location,
        };
        self.cursor.match_char('\'', false)?;
        if self.cursor.look() == '\'' {
            return Err(RuntimeError::unexpected("character", "'", location));
        }
        if self.cursor.look() == '\\' {
            self.cursor.advance()?;
        }
        let c = self.cursor.look();
        if c == EOF || self.cursor.line() != line {
            return Err(unterminated);
        }
        self.cursor.advance()?;
        if self.cursor.look() != '\'' || self.cursor.line() != line {
            return Err(unterminated);
        }
        self.cursor.match_char('\'', true)?;
        Ok(Value::Char(c))
    }

    /// `"..."`, closed on the same line.
    pub(crate) fn word_literal(&mut self) -> Result<Value, RuntimeError> {
        let location = self.cursor.location();
        let line = self.cursor.line();
        self.cursor.match_char('"', false)?;
        let mut text = String::new();
        while self.cursor.look() != '"' {
            if self.cursor.line() != line || self.cursor.is_at_end() {
                return Err(RuntimeError::UnterminatedLiteral {
                    quote: '"',
                    location,
                });
            }
            text.push(self.cursor.look());
            self.cursor.advance()?;
        }
        if self.cursor.line() != line {
            return Err(RuntimeError::UnterminatedLiteral {
                quote: '"',
                location,
            });
        }
        self.cursor.match_char('"', true)?;
        Ok(Value::Word(text))
    }

    // ========== Boolean ==========

    /// `expr := term ('|' term)*`; both sides are always evaluated.
    pub(crate) fn boolean_expression(&mut self) -> Result<bool, RuntimeError> {
        let mut value = self.boolean_term()?;
        while self.cursor.look() == '|' {
            self.cursor.match_char('|', false)?;
            if self.cursor.look() == '|' {
                self.cursor.match_char('|', false)?;
            }
            self.cursor.skip_white()?;
            let rhs = self.boolean_term()?;
            value |= rhs;
        }
        Ok(value)
    }

    fn boolean_term(&mut self) -> Result<bool, RuntimeError> {
        let mut value = self.boolean_factor()?;
        while self.cursor.look() == '&' {
            self.cursor.match_char('&', false)?;
            if self.cursor.look() == '&' {
                self.cursor.match_char('&', false)?;
            }
            self.cursor.skip_white()?;
            let rhs = self.boolean_factor()?;
            value &= rhs;
        }
        Ok(value)
    }

    fn boolean_factor(&mut self) -> Result<bool, RuntimeError> {
        let mut negate = false;
        while self.cursor.look() == '!' {
            negate = !negate;
            self.cursor.match_char('!', true)?;
        }

        let value = if self.cursor.look() == '(' && self.group_is_boolean() {
            self.cursor.match_char('(', true)?;
            let inner = self.boolean_expression()?;
            self.cursor.match_char(')', true)?;
            inner
        } else {
            self.boolean_atom()?
        };
        Ok(value != negate)
    }

    /// Whether the parenthesized group at the cursor holds a boolean
    /// expression rather than an arithmetic one.
    fn group_is_boolean(&self) -> bool {
        let rest = self.cursor.rest_of_line();
        let end = skip_group(rest, 0).min(rest.len());
        looks_boolean(&rest[1..end.saturating_sub(1).max(1)])
    }

    /// A literal, boolean variable or call, relation, or equality test.
    fn boolean_atom(&mut self) -> Result<bool, RuntimeError> {
        let location = self.cursor.location();
        let look = self.cursor.look();

        if look == '\'' || look == '"' {
            return self.text_equality();
        }

        if look.is_ascii_alphabetic() {
            let name = self.cursor.peek_name();
            let line = self.cursor.line();
            if name == "true" || name == "false" {
                self.cursor.read_name()?;
                return self.boolean_equality(name == "true", line, location);
            }

            let operand_type = if self.call_ahead() {
                let decl = self
                    .methods
                    .get(&name)
                    .ok_or_else(|| RuntimeError::UnknownMethod {
                        name: name.clone(),
                        location,
                    })?;
                decl.returns
            } else {
                Some(self.scope.lookup(&name, location)?.1.var_type)
            };

            match operand_type {
                Some(VarType::Boolean) => {
                    let value = if self.call_ahead() {
                        self.call_for_value()?
                    } else {
                        let name = self.cursor.read_name()?;
                        let (qualified, _) = self.scope.lookup(&name, location)?;
                        Some(self.scope.read(&self.ram, &qualified, location)?)
                    };
                    let value = value.and_then(|v| v.as_bool()).unwrap_or(false);
                    return self.boolean_equality(value, line, location);
                }
                Some(VarType::Char | VarType::Word) => return self.text_equality(),
                Some(_) => {}
                None => {
                    return Err(RuntimeError::TypeMismatch {
                        expected: "boolean".to_string(),
                        found: format!("nothing from \"{}\"", name),
                        location,
                    })
                }
            }
        }

        self.relation()
    }

    fn relation(&mut self) -> Result<bool, RuntimeError> {
        let a = self.arithmetic()?.as_f64().unwrap_or_default();
        let relation = self.relation_operator()?;
        let b = self.arithmetic()?.as_f64().unwrap_or_default();
        Ok(relation.holds(a, b))
    }

    fn relation_operator(&mut self) -> Result<Relation, RuntimeError> {
        let location = self.cursor.location();
        let (relation, len) = match (self.cursor.look(), self.cursor.peek_char(1)) {
            ('=', '=') => (Relation::Eq, 2),
            ('=', '>') | ('>', '=') => (Relation::Ge, 2),
            ('=', '<') | ('<', '=') => (Relation::Le, 2),
            ('!', '=') => (Relation::Ne, 2),
            ('=', _) => (Relation::Eq, 1),
            ('>', _) => (Relation::Gt, 1),
            ('<', _) => (Relation::Lt, 1),
            _ => {
                return Err(RuntimeError::unexpected(
                    "relational operator",
                    self.cursor.describe_look(),
                    location,
                ))
            }
        };
        for _ in 0..len {
            self.cursor.advance()?;
        }
        self.cursor.skip_white()?;
        Ok(relation)
    }

    /// Whether `==`, `=` or `!=` follows, as opposed to an ordering.
    fn equality_ahead(&self) -> bool {
        match (self.cursor.look(), self.cursor.peek_char(1)) {
            ('=', '<' | '>') => false,
            ('=', _) => true,
            ('!', '=') => true,
            _ => false,
        }
    }

    /// Completes `a == b` or `a != b` when the boolean `a` read on `line` is
    /// followed by an equality operator, otherwise yields `a` itself.
    fn boolean_equality(
        &mut self,
        a: bool,
        line: usize,
        location: SourceLocation,
    ) -> Result<bool, RuntimeError> {
        if self.cursor.line() != line || !self.equality_ahead() {
            return Ok(a);
        }
        let relation = self.relation_operator()?;
        match self.equality_operand()? {
            Value::Boolean(b) => Ok((a == b) == (relation == Relation::Eq)),
            other => Err(RuntimeError::TypeMismatch {
                expected: VarType::Boolean.to_string(),
                found: other.var_type().to_string(),
                location,
            }),
        }
    }

    /// Right-hand side of an equality test, read without assuming its type.
    fn equality_operand(&mut self) -> Result<Value, RuntimeError> {
        let look = self.cursor.look();
        if look.is_ascii_alphabetic() {
            let name = self.cursor.peek_name();
            if name == "true" || name == "false" {
                self.cursor.read_name()?;
                return Ok(Value::Boolean(name == "true"));
            }
            return self.text_operand();
        }
        if look == '\'' || look == '"' {
            return self.text_operand();
        }
        self.arithmetic()
    }

    /// Exact equality between two chars or two words.
    fn text_equality(&mut self) -> Result<bool, RuntimeError> {
        let location = self.cursor.location();
        let a = self.text_operand()?;
        let relation = self.relation_operator()?;
        if !matches!(relation, Relation::Eq | Relation::Ne) {
            return Err(RuntimeError::unexpected("== or !=", "ordering", location));
        }
        let b = self.equality_operand()?;
        if a.var_type() != b.var_type() {
            return Err(RuntimeError::TypeMismatch {
                expected: a.var_type().to_string(),
                found: b.var_type().to_string(),
                location,
            });
        }
        Ok((a == b) == (relation == Relation::Eq))
    }

    // ========== Output ==========

    /// Evaluates whatever follows `output` and formats it for printing.
    pub(crate) fn output_text(&mut self) -> Result<String, RuntimeError> {
        let location = self.cursor.location();
        if looks_boolean(self.cursor.rest_of_line()) {
            return Ok(self.boolean_expression()?.to_string());
        }

        let look = self.cursor.look();
        match look {
            '"' => Ok(self.word_literal()?.to_string()),
            '\'' => Ok(self.char_literal()?.to_string()),
            c if c.is_ascii_alphabetic() => {
                let name = self.cursor.peek_name();
                let kind = if self.call_ahead() {
                    self.methods
                        .get(&name)
                        .ok_or_else(|| RuntimeError::UnknownMethod {
                            name: name.clone(),
                            location,
                        })?
                        .returns
                } else {
                    Some(self.scope.lookup(&name, location)?.1.var_type)
                };
                match kind {
                    Some(VarType::Integer | VarType::Double) => {
                        Ok(self.arithmetic()?.to_string())
                    }
                    Some(VarType::Boolean) => Ok(self.boolean_expression()?.to_string()),
                    Some(_) => Ok(self.text_operand()?.to_string()),
                    None => Err(RuntimeError::TypeMismatch {
                        expected: "a value".to_string(),
                        found: format!("nothing from \"{}\"", name),
                        location,
                    }),
                }
            }
            _ => Ok(self.arithmetic()?.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_looks_boolean_relations() {
        assert!(looks_boolean(&chars("a < 3")));
        assert!(looks_boolean(&chars("!done")));
        assert!(looks_boolean(&chars("true")));
        assert!(looks_boolean(&chars("(x + 1) >= y")));
        assert!(looks_boolean(&chars("w == \"hi\"")));
    }

    #[test]
    fn test_looks_boolean_arithmetic() {
        assert!(!looks_boolean(&chars("a + 3")));
        assert!(!looks_boolean(&chars("\"x < y\"")));
        assert!(!looks_boolean(&chars("f(a < b) * 2")));
    }

    #[test]
    fn test_looks_boolean_stops_at_next_statement() {
        assert!(!looks_boolean(&chars("i i = i + 1")));
        assert!(!looks_boolean(&chars("x ] while(x < 3)")));
        assert!(!looks_boolean(&chars("x // a < b")));
    }

    #[test]
    fn test_skip_group_nested() {
        let text = chars("(a (b) \")\") rest");
        assert_eq!(skip_group(&text, 0), 11);
    }
}
