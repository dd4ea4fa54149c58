//! Index metadata and its JSON document form.
//!
//! An index is described by a name and an ordered list of field names:
//!
//! ```json
//! {"name": "idx_ab", "field_names": ["a", "b"]}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use kestrel_common::{KestrelError, KestrelResult};

use super::TableMeta;

const FIELD_NAME: &str = "name";
const FIELD_FIELD_NAMES: &str = "field_names";

/// Metadata for one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    name: String,
    field_names: Vec<String>,
}

impl IndexMeta {
    /// Creates index metadata after checking the name and every field.
    pub fn new(table: &TableMeta, name: &str, field_names: &[String]) -> KestrelResult<Self> {
        if name.trim().is_empty() {
            return Err(KestrelError::invalid_argument("index name is empty"));
        }
        if field_names.is_empty() {
            return Err(KestrelError::invalid_argument(format!(
                "index '{name}' has no fields"
            )));
        }
        for field in field_names {
            if table.field_by_name(field).is_none() {
                return Err(KestrelError::field_not_found(table.name(), field.as_str()));
            }
        }
        Ok(Self {
            name: name.to_string(),
            field_names: field_names.to_vec(),
        })
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field by position.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.field_names.get(index).map(String::as_str)
    }

    /// All indexed fields in order.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Number of indexed fields.
    pub fn field_num(&self) -> usize {
        self.field_names.len()
    }

    /// Encodes the metadata as a JSON document.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            FIELD_NAME: self.name,
            FIELD_FIELD_NAMES: self.field_names,
        })
        .to_string()
    }

    /// Decodes and validates a JSON document against `table`.
    ///
    /// A non-string name, a non-array field list, or a non-string element is
    /// `Internal`; a field missing from the table is `FieldNotFound`.
    pub fn from_json(table: &TableMeta, json: &str) -> KestrelResult<Self> {
        let document: JsonValue = serde_json::from_str(json)
            .map_err(|e| KestrelError::internal(format!("malformed index metadata: {e}")))?;

        let Some(name) = document.get(FIELD_NAME).and_then(JsonValue::as_str) else {
            warn!(document = %document, "index name is not a string");
            return Err(KestrelError::internal("index name is not a string"));
        };
        let Some(elements) = document.get(FIELD_FIELD_NAMES).and_then(JsonValue::as_array) else {
            warn!(index = name, "index field names are not an array");
            return Err(KestrelError::internal(format!(
                "field names of index '{name}' are not an array"
            )));
        };

        let mut field_names = Vec::with_capacity(elements.len());
        for element in elements {
            let field = element.as_str().ok_or_else(|| {
                KestrelError::internal(format!("index '{name}' has a non-string field name"))
            })?;
            if table.field_by_name(field).is_none() {
                warn!(index = name, field, "index refers to a missing field");
                return Err(KestrelError::field_not_found(table.name(), field));
            }
            field_names.push(field.to_string());
        }

        Self::new(table, name, &field_names)
    }
}

impl fmt::Display for IndexMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index name={}, field={}",
            self.name,
            self.field_names.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AttrInfo;
    use crate::value::AttrType;
    use kestrel_common::ErrorCode;

    fn table() -> TableMeta {
        TableMeta::new(
            1,
            "t",
            &[AttrInfo::new("a", AttrType::Ints), AttrInfo::new("b", AttrType::Ints)],
        )
        .unwrap()
    }

    #[test]
    fn test_json_round_trip() {
        let table = table();
        let index = IndexMeta::new(&table, "idx_ab", &["a".into(), "b".into()]).unwrap();
        let json = index.to_json();
        assert_eq!(IndexMeta::from_json(&table, &json).unwrap(), index);
        assert_eq!(index.to_string(), "index name=idx_ab, field=a, b");
    }

    #[test]
    fn test_from_json_errors() {
        let table = table();
        let code = |json: &str| IndexMeta::from_json(&table, json).unwrap_err().code();

        assert_eq!(code(r#"{"name": 5, "field_names": ["a"]}"#), ErrorCode::Internal);
        assert_eq!(code(r#"{"name": "i", "field_names": "a"}"#), ErrorCode::Internal);
        assert_eq!(code(r#"{"name": "i", "field_names": [1]}"#), ErrorCode::Internal);
        assert_eq!(code(r#"{"name": "i", "field_names": ["zz"]}"#), ErrorCode::FieldNotFound);
        assert_eq!(code(r#"{"name": " ", "field_names": ["a"]}"#), ErrorCode::InvalidArgument);
        assert_eq!(code("not json"), ErrorCode::Internal);
    }
}
