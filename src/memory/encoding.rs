//! Bit layouts of the primitive types
//!
//! | type    | width       | layout                                              |
//! |---------|-------------|-----------------------------------------------------|
//! | integer | 32          | sign flag, then 31-bit magnitude                    |
//! | double  | 64          | sign flag, integer-part field, fraction-digit field |
//! | char    | 16          | character code, zero-extended                       |
//! | word    | 16 × length | one 16-bit code per character (NUL when empty)      |
//! | boolean | 1           | the flag                                            |
//!
//! Bits are stored most significant first. Doubles are written from their
//! decimal text: the digits before and after the `.` are stored as two
//! unsigned integers and joined back with a `.` on read. Leading zeros of the
//! fraction are therefore lost (`1.05` reads back as `1.5`).

use super::value::{Value, VarType};
use super::MemoryError;

const INTEGER_MAGNITUDE_BITS: usize = 31;
const DOUBLE_WIDTH: usize = 64;
/// Minimum width of the double integer-part field
const DOUBLE_INT_FIELD: usize = 31;
/// Maximum combined significant width of both double fields
const DOUBLE_SIGNIFICANT_BITS: usize = 63;
const DOUBLE_PART_DIGITS: usize = 19;
const CODE_BITS: usize = 16;
const MAX_CHAR_CODE: u32 = 256;

/// An encoded value ready to be copied into a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bits: Vec<bool>,
    /// Start of the fraction field (doubles only), relative to the bucket
    pub split: Option<usize>,
}

fn push_bits(out: &mut Vec<bool>, value: u64, width: usize) {
    for i in (0..width).rev() {
        out.push((value >> i) & 1 == 1);
    }
}

fn read_bits(bits: &[bool]) -> u64 {
    bits.iter().fold(0u64, |acc, bit| (acc << 1) | u64::from(*bit))
}

fn binary_len(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        64 - value.leading_zeros() as usize
    }
}

fn invalid(var_type: VarType, value: impl ToString, reason: &str) -> MemoryError {
    MemoryError::InvalidEncoding {
        var_type,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn encode(value: &Value) -> Result<Encoded, MemoryError> {
    let mut bits = Vec::new();
    let mut split = None;
    match value {
        Value::Integer(n) => {
            let magnitude = n.unsigned_abs();
            if magnitude >= 1 << INTEGER_MAGNITUDE_BITS {
                return Err(invalid(
                    VarType::Integer,
                    n,
                    "magnitude does not fit in 31 bits",
                ));
            }
            bits.push(*n < 0);
            push_bits(&mut bits, u64::from(magnitude), INTEGER_MAGNITUDE_BITS);
        }
        Value::Double(d) => {
            let (field, encoded) = encode_double(*d)?;
            split = Some(field);
            bits = encoded;
        }
        Value::Char(c) => {
            let code = u32::from(*c);
            if code >= MAX_CHAR_CODE {
                return Err(invalid(VarType::Char, c, "character code above 255"));
            }
            push_bits(&mut bits, u64::from(code), CODE_BITS);
        }
        Value::Word(w) => {
            if w.is_empty() {
                push_bits(&mut bits, 0, CODE_BITS);
            }
            for c in w.chars() {
                let code = u32::from(c);
                if code > u32::from(u16::MAX) {
                    return Err(invalid(VarType::Word, w, "character code above 16 bits"));
                }
                push_bits(&mut bits, u64::from(code), CODE_BITS);
            }
        }
        Value::Boolean(b) => bits.push(*b),
    }
    Ok(Encoded { bits, split })
}

fn parse_double_part(d: f64, text: &str) -> Result<u64, MemoryError> {
    if text.is_empty() || text.len() > DOUBLE_PART_DIGITS {
        return Err(invalid(VarType::Double, d, "part longer than 19 digits"));
    }
    match text.parse::<u64>() {
        Ok(part) if part <= i64::MAX as u64 => Ok(part),
        _ => Err(invalid(VarType::Double, d, "part above 2^63-1")),
    }
}

/// Returns the split offset and the 64 encoded bits.
fn encode_double(d: f64) -> Result<(usize, Vec<bool>), MemoryError> {
    if !d.is_finite() {
        return Err(invalid(VarType::Double, d, "not a finite number"));
    }
    // `{}` never switches to exponent notation for f64
    let text = format!("{}", d.abs());
    let (int_text, frac_text) = text.split_once('.').unwrap_or((&text, "0"));
    let int_part = parse_double_part(d, int_text)?;
    let frac_part = parse_double_part(d, frac_text)?;

    let int_len = binary_len(int_part);
    let frac_len = binary_len(frac_part);
    if int_len + frac_len > DOUBLE_SIGNIFICANT_BITS {
        return Err(invalid(VarType::Double, d, "parts wider than 63 bits"));
    }

    let field = if frac_len > 32 {
        DOUBLE_SIGNIFICANT_BITS - frac_len
    } else {
        DOUBLE_INT_FIELD
    };
    let int_width = int_len.max(field);
    let split = 1 + int_width;

    let mut bits = Vec::with_capacity(DOUBLE_WIDTH);
    bits.push(d.is_sign_negative());
    push_bits(&mut bits, int_part, int_width);
    push_bits(&mut bits, frac_part, DOUBLE_WIDTH - split);
    Ok((split, bits))
}

pub fn decode(var_type: VarType, bits: &[bool], split: Option<usize>) -> Value {
    match var_type {
        VarType::Integer => {
            let magnitude = read_bits(bits.get(1..).unwrap_or_default()) as i64;
            let n = if bits.first().copied().unwrap_or(false) {
                -magnitude
            } else {
                magnitude
            };
            Value::Integer(n as i32)
        }
        VarType::Double => {
            let split = split.unwrap_or(1 + DOUBLE_INT_FIELD).min(bits.len());
            let int_part = read_bits(bits.get(1..split).unwrap_or_default());
            let frac_part = read_bits(&bits[split..]);
            let magnitude: f64 = format!("{}.{}", int_part, frac_part)
                .parse()
                .unwrap_or(0.0);
            if bits.first().copied().unwrap_or(false) {
                Value::Double(-magnitude)
            } else {
                Value::Double(magnitude)
            }
        }
        VarType::Char => Value::Char(code_to_char(read_bits(bits))),
        VarType::Word => {
            let word: String = bits
                .chunks(CODE_BITS)
                .map(|chunk| code_to_char(read_bits(chunk)))
                .collect();
            if word == "\0" {
                Value::Word(String::new())
            } else {
                Value::Word(word)
            }
        }
        VarType::Boolean => Value::Boolean(bits.first().copied().unwrap_or(false)),
    }
}

fn code_to_char(code: u64) -> char {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Storage width a value will occupy
pub fn width_of(value: &Value) -> usize {
    match value {
        Value::Word(w) => CODE_BITS * w.chars().count().max(1),
        other => other.var_type().fixed_width().unwrap_or(CODE_BITS),
    }
}
