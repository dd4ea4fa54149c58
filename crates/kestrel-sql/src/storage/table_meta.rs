//! Table and field metadata.

use serde::{Deserialize, Serialize};

use kestrel_common::{KestrelError, KestrelResult, SYS_FIELD_LEN, SYS_FIELD_NAME};

use crate::parser::AttrInfo;
use crate::value::AttrType;

/// Placement and type of one column inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    name: String,
    #[serde(rename = "type")]
    attr_type: AttrType,
    offset: usize,
    len: usize,
    visible: bool,
}

impl FieldMeta {
    /// Creates field metadata.
    pub fn new(
        name: impl Into<String>,
        attr_type: AttrType,
        offset: usize,
        len: usize,
        visible: bool,
    ) -> Self {
        Self {
            name: name.into(),
            attr_type,
            offset,
            len,
            visible,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type.
    pub fn attr_type(&self) -> AttrType {
        self.attr_type
    }

    /// Byte offset within the record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte length within the record.
    pub fn len(&self) -> usize {
        self.len
    }

    /// False for system fields.
    pub fn visible(&self) -> bool {
        self.visible
    }
}

/// Schema of a table: system fields first, then user fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    table_id: u32,
    name: String,
    fields: Vec<FieldMeta>,
    record_size: usize,
}

impl TableMeta {
    /// Lays out a table from its column definitions.
    ///
    /// `attrs` must already carry resolved lengths for CHARS columns.
    pub fn new(table_id: u32, name: &str, attrs: &[AttrInfo]) -> KestrelResult<Self> {
        if name.trim().is_empty() {
            return Err(KestrelError::invalid_argument("table name is empty"));
        }
        if attrs.is_empty() {
            return Err(KestrelError::invalid_argument(format!(
                "table '{name}' has no columns"
            )));
        }

        let mut fields = vec![FieldMeta::new(
            SYS_FIELD_NAME,
            AttrType::Ints,
            0,
            SYS_FIELD_LEN,
            false,
        )];
        let mut offset = SYS_FIELD_LEN;

        for attr in attrs {
            if attr.name.trim().is_empty() || attr.name == "*" {
                return Err(KestrelError::invalid_argument(format!(
                    "invalid column name '{}'",
                    attr.name
                )));
            }
            if fields.iter().any(|f| f.name == attr.name) {
                return Err(KestrelError::invalid_argument(format!(
                    "duplicate column '{}' in table '{name}'",
                    attr.name
                )));
            }
            let len = match attr.attr_type {
                AttrType::Undefined => {
                    return Err(KestrelError::invalid_argument(format!(
                        "column '{}' has no type",
                        attr.name
                    )))
                }
                AttrType::Chars if attr.length == 0 => {
                    return Err(KestrelError::invalid_argument(format!(
                        "column '{}' has zero length",
                        attr.name
                    )))
                }
                AttrType::Chars => attr.length,
                fixed => fixed.fixed_len().unwrap_or(attr.length),
            };
            fields.push(FieldMeta::new(&attr.name, attr.attr_type, offset, len, true));
            offset += len;
        }

        Ok(Self {
            table_id,
            name: name.to_string(),
            fields,
            record_size: offset,
        })
    }

    /// Table id assigned by the catalog.
    pub fn table_id(&self) -> u32 {
        self.table_id
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of fields, system fields included.
    pub fn field_num(&self) -> usize {
        self.fields.len()
    }

    /// Number of leading system fields.
    pub fn sys_field_num(&self) -> usize {
        self.fields.iter().take_while(|f| !f.visible).count()
    }

    /// Field by ordinal, system fields included.
    pub fn field(&self, index: usize) -> Option<&FieldMeta> {
        self.fields.get(index)
    }

    /// Field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The hidden transaction field.
    pub fn trx_field(&self) -> Option<&FieldMeta> {
        self.field_by_name(SYS_FIELD_NAME)
    }

    /// User-visible fields in declaration order.
    pub fn user_fields(&self) -> &[FieldMeta] {
        &self.fields[self.sys_field_num()..]
    }

    /// Bytes per record.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Serializes the schema as a JSON document.
    pub fn to_json(&self) -> KestrelResult<String> {
        serde_json::to_string(self).map_err(|e| KestrelError::internal(e.to_string()))
    }

    /// Parses a schema from a JSON document.
    pub fn from_json(json: &str) -> KestrelResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            KestrelError::internal(format!("failed to decode table metadata: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> Vec<AttrInfo> {
        vec![
            AttrInfo::new("id", AttrType::Ints),
            AttrInfo::chars("name", 8),
            AttrInfo::new("born", AttrType::Dates),
        ]
    }

    #[test]
    fn test_layout() {
        let meta = TableMeta::new(1, "people", &attrs()).unwrap();
        assert_eq!(meta.field_num(), 4);
        assert_eq!(meta.sys_field_num(), 1);
        assert_eq!(meta.field(0).unwrap().name(), SYS_FIELD_NAME);
        assert!(!meta.field(0).unwrap().visible());

        let name = meta.field_by_name("name").unwrap();
        assert_eq!((name.offset(), name.len()), (8, 8));
        let born = meta.field_by_name("born").unwrap();
        assert_eq!(born.offset(), 16);
        assert_eq!(meta.record_size(), 20);
        assert_eq!(meta.user_fields().len(), 3);
    }

    #[test]
    fn test_rejects_bad_definitions() {
        assert!(TableMeta::new(1, " ", &attrs()).is_err());
        assert!(TableMeta::new(1, "t", &[]).is_err());

        let dup = vec![
            AttrInfo::new("a", AttrType::Ints),
            AttrInfo::new("a", AttrType::Floats),
        ];
        assert!(TableMeta::new(1, "t", &dup).is_err());
        assert!(TableMeta::new(1, "t", &[AttrInfo::chars("c", 0)]).is_err());
        assert!(TableMeta::new(1, "t", &[AttrInfo::new(SYS_FIELD_NAME, AttrType::Ints)]).is_err());
    }

    #[test]
    fn test_json_document() {
        let meta = TableMeta::new(3, "people", &attrs()).unwrap();
        let json = meta.to_json().unwrap();
        assert!(json.contains("\"type\":\"chars\""));
        assert_eq!(TableMeta::from_json(&json).unwrap(), meta);
        assert!(TableMeta::from_json("{\"name\": 1}").is_err());
    }
}
