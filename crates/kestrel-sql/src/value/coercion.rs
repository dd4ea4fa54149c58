//! Coercion policy between value types.
//!
//! Mixed-type comparisons follow one fixed priority: integer, then float,
//! then text. [`comparison_target`] is the single place that decides which
//! domain two operand types are compared in; [`coerce_to_column`] decides
//! what a value becomes when it is stored into a typed column.

use super::{AttrType, Date, Value};

/// Domain in which two differently typed values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionTarget {
    /// Both sides as `i32`.
    Int,
    /// Both sides as `f32`.
    Float,
    /// Both sides as canonical text.
    Text,
}

/// Returns the comparison domain for two operand types, or `None` when the
/// pair has no defined comparison (for example booleans against dates).
pub fn comparison_target(left: AttrType, right: AttrType) -> Option<CoercionTarget> {
    use AttrType::*;

    let coercible_to_number = |ty: AttrType| matches!(ty, Ints | Floats | Booleans | Chars);

    if left == Ints || right == Ints {
        let other = if left == Ints { right } else { left };
        return coercible_to_number(other).then_some(CoercionTarget::Int);
    }
    if left == Floats || right == Floats {
        let other = if left == Floats { right } else { left };
        return coercible_to_number(other).then_some(CoercionTarget::Float);
    }
    if left == Chars || right == Chars {
        let other = if left == Chars { right } else { left };
        return matches!(other, Chars | Booleans | Dates).then_some(CoercionTarget::Text);
    }
    None
}

/// Converts a value so it can be stored in a column of `target` type.
///
/// Integers and floats convert into each other (floats truncate toward
/// zero), text converts to numbers with a best-effort leading parse, any
/// value renders into a text column, and text in `YYYY-MM-DD` form becomes a
/// date. Everything else has no conversion.
pub fn coerce_to_column(value: &Value, target: AttrType) -> Option<Value> {
    if value.attr_type() == target {
        return Some(value.clone());
    }
    match (value, target) {
        (Value::Null, _) => None,
        (Value::Float(f), AttrType::Ints) => Some(Value::Int(*f as i32)),
        (Value::Chars(s), AttrType::Ints) => Some(Value::Int(parse_int_prefix(s))),
        (Value::Int(i), AttrType::Floats) => Some(Value::Float(*i as f32)),
        (Value::Chars(s), AttrType::Floats) => Some(Value::Float(parse_float_prefix(s))),
        (Value::Chars(s), AttrType::Dates) => {
            Some(Value::Date(Date::parse(s).unwrap_or(Date::ZERO)))
        }
        (_, AttrType::Chars) => Some(Value::Chars(value.to_string())),
        _ => None,
    }
}

/// Parses the longest leading integer of `text`, like C `atoi`.
///
/// Leading whitespace and one sign are accepted. Returns 0 when no digits
/// are found or the number does not fit in an `i32`.
pub fn parse_int_prefix(text: &str) -> i32 {
    let trimmed = text.trim_start();
    let end = numeric_prefix_len(trimmed, false);
    trimmed[..end].parse::<i32>().unwrap_or(0)
}

/// Parses the longest leading decimal number of `text`, like C `atof`.
///
/// Returns 0.0 when no number is found.
pub fn parse_float_prefix(text: &str) -> f32 {
    let trimmed = text.trim_start();
    let end = numeric_prefix_len(trimmed, true);
    trimmed[..end].parse::<f32>().unwrap_or(0.0)
}

/// Returns true when the whole of `text` (ignoring surrounding whitespace)
/// is a number.
pub(crate) fn is_numeric(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && numeric_prefix_len(trimmed, true) == trimmed.len()
}

fn numeric_prefix_len(text: &str, allow_fraction: bool) -> usize {
    let bytes = text.as_bytes();
    let mut pos = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let digits_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - digits_start;

    if allow_fraction && pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            pos = frac_end;
        }
    }

    if digits == 0 {
        return 0;
    }

    if allow_fraction && pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            pos = exp;
        }
    }

    pos
}
