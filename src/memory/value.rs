//! Runtime value representation
//!
//! This module defines [`VarType`], the five primitive types of the language,
//! and [`Value`], a decoded value of one of those types. Values only live
//! transiently: every variable is stored as bits in the [`Ram`](super::ram::Ram)
//! and decoded on each read.
//!
//! # Display
//!
//! `Display` on [`Value`] is the `output` format: integers in decimal, doubles
//! always with a fractional digit (`5.0`) and in `1.0E10` form outside
//! `[1e-3, 1e7)`, chars and words verbatim, booleans as `true`/`false`.

use std::fmt;

/// The five primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Integer,
    Double,
    Char,
    Word,
    Boolean,
}

impl VarType {
    pub const ALL: [VarType; 5] = [
        VarType::Integer,
        VarType::Double,
        VarType::Char,
        VarType::Word,
        VarType::Boolean,
    ];

    /// The keyword that names this type in source text
    pub fn keyword(&self) -> &'static str {
        match self {
            VarType::Integer => "integer",
            VarType::Double => "double",
            VarType::Char => "char",
            VarType::Word => "word",
            VarType::Boolean => "boolean",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        VarType::ALL.into_iter().find(|t| t.keyword() == keyword)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, VarType::Integer | VarType::Double)
    }

    /// Fixed storage width in bits, `None` for words
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            VarType::Integer => Some(32),
            VarType::Double => Some(64),
            VarType::Char => Some(16),
            VarType::Word => None,
            VarType::Boolean => Some(1),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A decoded runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Double(f64),
    Char(char),
    Word(String),
    Boolean(bool),
}

impl Value {
    pub fn var_type(&self) -> VarType {
        match self {
            Value::Integer(_) => VarType::Integer,
            Value::Double(_) => VarType::Double,
            Value::Char(_) => VarType::Char,
            Value::Word(_) => VarType::Word,
            Value::Boolean(_) => VarType::Boolean,
        }
    }

    /// Numeric view of the value, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(f64::from(*n)),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Double(d) => f.write_str(&format_double(*d)),
            Value::Char(c) => write!(f, "{}", c),
            Value::Word(w) => f.write_str(w),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Formats a double the way `output` prints it.
pub fn format_double(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_string();
    }
    if d.is_infinite() {
        return if d > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if d == 0.0 {
        return if d.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = d.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let text = format!("{}", d);
        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    } else {
        // Rust renders `1e10` / `1.5e-5`; the mantissa always carries a fraction
        let text = format!("{:e}", d);
        match text.split_once('e') {
            Some((mantissa, exponent)) if mantissa.contains('.') => {
                format!("{}E{}", mantissa, exponent)
            }
            Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for t in VarType::ALL {
            assert_eq!(VarType::from_keyword(t.keyword()), Some(t));
        }
        assert_eq!(VarType::from_keyword("int"), None);
    }

    #[test]
    fn test_double_display() {
        assert_eq!(Value::Double(5.0).to_string(), "5.0");
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert_eq!(Value::Double(-0.25).to_string(), "-0.25");
        assert_eq!(Value::Double(1e10).to_string(), "1.0E10");
        assert_eq!(Value::Double(1.5e-5).to_string(), "1.5E-5");
        assert_eq!(Value::Double(0.0).to_string(), "0.0");
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Value::Integer(-42).to_string(), "-42");
        assert_eq!(Value::Char('x').to_string(), "x");
        assert_eq!(Value::Word("hi there".into()).to_string(), "hi there");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }
}
