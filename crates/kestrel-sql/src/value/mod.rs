//! Scalar values.
//!
//! A [`Value`] is a tagged union over the engine's column types. Values are
//! plain owned data: cloning copies, nothing is shared between values.
//!
//! Comparison across types goes through the policy in [`coercion`]:
//!
//! ```text
//!   either side int?    -> compare as i32   (float truncates, bool 0/1, text atoi)
//!   else either float?  -> compare as f32   (bool 0/1, text atof)
//!   else either text?   -> compare as text  (bool "1"/"0", date "YYYY-MM-DD")
//!   else                -> no ordering      (compare() reports -1)
//! ```

mod attr_type;
pub mod coercion;
mod date;

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use tracing::trace;

use kestrel_common::{KestrelError, KestrelResult, FIXED_FIELD_LEN, FLOAT_EPSILON};

pub use attr_type::AttrType;
pub use coercion::CoercionTarget;
pub use date::Date;

/// A scalar value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// 32-bit integer.
    Int(i32),
    /// 32-bit float.
    Float(f32),
    /// Owned text.
    Chars(String),
    /// Packed date.
    Date(Date),
    /// Boolean.
    Boolean(bool),
}

impl Value {
    /// Decodes a value of `attr_type` from raw record bytes.
    ///
    /// Text stops at the first NUL byte. Fixed-width types need at least
    /// four bytes.
    pub fn from_data(attr_type: AttrType, data: &[u8]) -> KestrelResult<Self> {
        let fixed = || -> KestrelResult<[u8; 4]> {
            data.get(..FIXED_FIELD_LEN)
                .and_then(|b| b.try_into().ok())
                .ok_or_else(|| {
                    KestrelError::internal(format!(
                        "{} value needs {} bytes, got {}",
                        attr_type,
                        FIXED_FIELD_LEN,
                        data.len()
                    ))
                })
        };

        Ok(match attr_type {
            AttrType::Undefined => Value::Null,
            AttrType::Chars => {
                let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
                Value::Chars(String::from_utf8_lossy(&data[..end]).into_owned())
            }
            AttrType::Ints => Value::Int(i32::from_le_bytes(fixed()?)),
            AttrType::Floats => Value::Float(f32::from_le_bytes(fixed()?)),
            AttrType::Dates => Value::Date(Date::from_packed(u32::from_le_bytes(fixed()?))),
            AttrType::Booleans => Value::Boolean(i32::from_le_bytes(fixed()?) != 0),
        })
    }

    /// Replaces this value with one decoded from raw bytes.
    pub fn set_data(&mut self, attr_type: AttrType, data: &[u8]) -> KestrelResult<()> {
        *self = Self::from_data(attr_type, data)?;
        Ok(())
    }

    /// Encodes the value as raw record bytes.
    pub fn data(&self) -> Vec<u8> {
        match self {
            Value::Null => Vec::new(),
            Value::Int(v) => v.to_le_bytes().to_vec(),
            Value::Float(v) => v.to_le_bytes().to_vec(),
            Value::Chars(s) => s.as_bytes().to_vec(),
            Value::Date(d) => d.packed().to_le_bytes().to_vec(),
            Value::Boolean(b) => i32::from(*b).to_le_bytes().to_vec(),
        }
    }

    /// Byte length of the encoded value.
    pub fn length(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Chars(s) => s.len(),
            _ => FIXED_FIELD_LEN,
        }
    }

    /// Returns the type tag of the active variant.
    pub fn attr_type(&self) -> AttrType {
        match self {
            Value::Null => AttrType::Undefined,
            Value::Int(_) => AttrType::Ints,
            Value::Float(_) => AttrType::Floats,
            Value::Chars(_) => AttrType::Chars,
            Value::Date(_) => AttrType::Dates,
            Value::Boolean(_) => AttrType::Booleans,
        }
    }

    /// Returns true for the absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Replaces the value with an integer.
    pub fn set_int(&mut self, v: i32) {
        *self = Value::Int(v);
    }

    /// Replaces the value with a float.
    pub fn set_float(&mut self, v: f32) {
        *self = Value::Float(v);
    }

    /// Replaces the value with a boolean.
    pub fn set_boolean(&mut self, v: bool) {
        *self = Value::Boolean(v);
    }

    /// Replaces the value with a date.
    pub fn set_date(&mut self, v: Date) {
        *self = Value::Date(v);
    }

    /// Replaces the value with text.
    pub fn set_string(&mut self, v: impl Into<String>) {
        *self = Value::Chars(v.into());
    }

    /// Copies another value into this one.
    pub fn set_value(&mut self, other: &Value) {
        *self = other.clone();
    }

    /// Integer view of the value.
    ///
    /// Text uses a leading-integer parse (0 on failure), floats truncate,
    /// booleans are 0/1 and dates yield their packed form.
    pub fn get_int(&self) -> i32 {
        match self {
            Value::Null => 0,
            Value::Int(v) => *v,
            Value::Float(v) => *v as i32,
            Value::Chars(s) => coercion::parse_int_prefix(s),
            Value::Date(d) => d.packed() as i32,
            Value::Boolean(b) => i32::from(*b),
        }
    }

    /// Float view of the value. Dates have no float form and yield 0.0.
    pub fn get_float(&self) -> f32 {
        match self {
            Value::Null | Value::Date(_) => 0.0,
            Value::Int(v) => *v as f32,
            Value::Float(v) => *v,
            Value::Chars(s) => coercion::parse_float_prefix(s),
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Boolean view of the value.
    ///
    /// Numeric text is true when non-zero; other text is true when
    /// non-empty.
    pub fn get_boolean(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int(v) => *v != 0,
            Value::Float(v) => v.abs() >= FLOAT_EPSILON,
            Value::Chars(s) => {
                if coercion::is_numeric(s) {
                    coercion::parse_float_prefix(s.trim()).abs() >= FLOAT_EPSILON
                } else {
                    !s.is_empty()
                }
            }
            Value::Date(d) => d.is_valid(),
            Value::Boolean(b) => *b,
        }
    }

    /// Date view of the value. Text in `YYYY-MM-DD` form parses; anything
    /// else yields the zero date.
    pub fn get_date(&self) -> Date {
        match self {
            Value::Date(d) => *d,
            Value::Chars(s) => Date::parse(s).unwrap_or_else(|_| {
                trace!(text = %s, "failed to convert text to date");
                Date::ZERO
            }),
            _ => Date::ZERO,
        }
    }

    /// Canonical text form; same as `to_string`.
    pub fn get_string(&self) -> String {
        self.to_string()
    }

    /// Compares two values under the coercion policy.
    ///
    /// Returns `None` when the pair of types has no defined ordering.
    pub fn compare_with(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => return Some(Ordering::Equal),
            (Value::Int(a), Value::Int(b)) => return Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => return Some(compare_float(*a, *b)),
            (Value::Chars(a), Value::Chars(b)) => return Some(a.as_bytes().cmp(b.as_bytes())),
            (Value::Date(a), Value::Date(b)) => return Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => return Some(a.cmp(b)),
            _ => {}
        }

        match coercion::comparison_target(self.attr_type(), other.attr_type())? {
            CoercionTarget::Int => Some(self.get_int().cmp(&other.get_int())),
            CoercionTarget::Float => Some(compare_float(self.get_float(), other.get_float())),
            CoercionTarget::Text => {
                Some(self.to_string().as_bytes().cmp(other.to_string().as_bytes()))
            }
        }
    }

    /// Three-way comparison returning negative, zero or positive.
    ///
    /// Pairs with no defined ordering (for example a boolean against a date)
    /// report -1; use [`Value::compare_with`] to tell that case apart.
    pub fn compare(&self, other: &Value) -> i32 {
        match self.compare_with(other) {
            Some(Ordering::Less) => -1,
            Some(Ordering::Equal) => 0,
            Some(Ordering::Greater) => 1,
            None => {
                trace!(
                    left = %self.attr_type(),
                    right = %other.attr_type(),
                    "unsupported comparison"
                );
                -1
            }
        }
    }

    /// Full-match of this text against the pattern in `pattern`.
    ///
    /// Returns 1 on match and 0 otherwise. Non-text operands and invalid
    /// patterns also yield 0, which is a failure sentinel and not "false";
    /// use [`Value::like_match`] to distinguish.
    pub fn compare_like(&self, pattern: &Value) -> i32 {
        match self.like_match(pattern) {
            Ok(true) => 1,
            Ok(false) => 0,
            Err(e) => {
                trace!(error = %e, "like comparison failed");
                0
            }
        }
    }

    /// Inverse of [`Value::compare_like`]; failures also yield 0.
    pub fn compare_not_like(&self, pattern: &Value) -> i32 {
        match self.like_match(pattern) {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(e) => {
                trace!(error = %e, "not like comparison failed");
                0
            }
        }
    }

    /// Matches this text against a regular expression that must cover the
    /// whole string.
    pub fn like_match(&self, pattern: &Value) -> KestrelResult<bool> {
        let (Value::Chars(text), Value::Chars(pattern)) = (self, pattern) else {
            return Err(KestrelError::invalid_argument(format!(
                "LIKE needs text operands, got {} and {}",
                self.attr_type(),
                pattern.attr_type()
            )));
        };
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            KestrelError::invalid_argument(format!("invalid LIKE pattern '{pattern}': {e}"))
        })?;
        Ok(regex.is_match(text))
    }
}

fn compare_float(a: f32, b: f32) -> Ordering {
    let diff = a - b;
    if diff.abs() < FLOAT_EPSILON {
        Ordering::Equal
    } else if diff > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Chars(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{d}"),
            Value::Boolean(b) => f.write_str(if *b { "1" } else { "0" }),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Chars(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Chars(v)
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Value::Date(v)
    }
}
