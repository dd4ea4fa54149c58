//! Column and value type tags.

use std::fmt;

use serde::{Deserialize, Serialize};

use kestrel_common::FIXED_FIELD_LEN;

/// Type tag carried by every value and declared by every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    /// No type; the tag of an absent value.
    #[default]
    Undefined,
    /// Fixed-capacity text.
    Chars,
    /// 32-bit signed integer.
    Ints,
    /// 32-bit float.
    Floats,
    /// Packed calendar date.
    Dates,
    /// Boolean.
    Booleans,
}

impl AttrType {
    /// Returns the textual name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            AttrType::Undefined => "undefined",
            AttrType::Chars => "chars",
            AttrType::Ints => "ints",
            AttrType::Floats => "floats",
            AttrType::Dates => "dates",
            AttrType::Booleans => "booleans",
        }
    }

    /// Parses a textual type name. Unknown names map to `Undefined`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "chars" => AttrType::Chars,
            "ints" => AttrType::Ints,
            "floats" => AttrType::Floats,
            "dates" => AttrType::Dates,
            "booleans" => AttrType::Booleans,
            _ => AttrType::Undefined,
        }
    }

    /// Storage width for fixed-size types, `None` for text and undefined.
    pub const fn fixed_len(self) -> Option<usize> {
        match self {
            AttrType::Ints | AttrType::Floats | AttrType::Dates | AttrType::Booleans => {
                Some(FIXED_FIELD_LEN)
            }
            AttrType::Chars | AttrType::Undefined => None,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        for ty in [
            AttrType::Undefined,
            AttrType::Chars,
            AttrType::Ints,
            AttrType::Floats,
            AttrType::Dates,
            AttrType::Booleans,
        ] {
            assert_eq!(AttrType::from_name(ty.name()), ty);
        }
        assert_eq!(AttrType::from_name("decimal"), AttrType::Undefined);
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&AttrType::Floats).unwrap();
        assert_eq!(json, "\"floats\"");
    }
}
