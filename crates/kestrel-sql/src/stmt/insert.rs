//! INSERT binding.

use std::sync::Arc;

use tracing::warn;

use kestrel_common::{KestrelError, KestrelResult};

use super::lookup_table;
use crate::parser::InsertSqlNode;
use crate::storage::{Db, FieldMeta, Table};
use crate::value::coercion::coerce_to_column;
use crate::value::Value;

/// A bound INSERT with values already converted to the column types.
#[derive(Debug, Clone)]
pub struct InsertStmt {
    table: Arc<Table>,
    values: Vec<Value>,
}

impl InsertStmt {
    /// Binds an INSERT.
    pub fn create(db: &Db, node: &InsertSqlNode) -> KestrelResult<Self> {
        if node.values.is_empty() {
            return Err(KestrelError::invalid_argument("INSERT needs at least one value"));
        }
        let table = lookup_table(db, &node.relation_name)?;

        let fields = table.table_meta().user_fields();
        if fields.len() != node.values.len() {
            warn!(
                table = table.name(),
                values = node.values.len(),
                fields = fields.len(),
                "schema mismatch"
            );
            return Err(KestrelError::FieldCountMismatch {
                table: table.name().to_string(),
                expected: fields.len(),
                actual: node.values.len(),
            });
        }

        let values = fields
            .iter()
            .zip(&node.values)
            .map(|(field, value)| coerce_for_field(table.name(), field, value))
            .collect::<KestrelResult<Vec<_>>>()?;

        Ok(Self { table, values })
    }

    /// Target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Converts `value` for storage in `field` and checks it fits.
pub(crate) fn coerce_for_field(
    table: &str,
    field: &FieldMeta,
    value: &Value,
) -> KestrelResult<Value> {
    let converted = coerce_to_column(value, field.attr_type()).ok_or_else(|| {
        warn!(table, field = field.name(), from = %value.attr_type(), "field type mismatch");
        KestrelError::FieldTypeMismatch {
            table: table.to_string(),
            field: field.name().to_string(),
            expected: field.attr_type().to_string(),
            actual: value.attr_type().to_string(),
        }
    })?;

    match &converted {
        Value::Date(date) if !date.is_valid() => {
            Err(KestrelError::invalid_value(format!(
                "'{value}' is not a valid date for '{table}.{}'",
                field.name()
            )))
        }
        Value::Chars(text) if text.len() > field.len() => {
            Err(KestrelError::invalid_value(format!(
                "'{text}' is longer than {} bytes for '{table}.{}'",
                field.len(),
                field.name()
            )))
        }
        _ => Ok(converted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AttrInfo;
    use crate::value::{AttrType, Date};
    use kestrel_common::config::StorageConfig;
    use kestrel_common::ErrorCode;

    fn db() -> Db {
        let db = Db::new("test", StorageConfig::default());
        db.create_table(
            "t",
            &[
                AttrInfo::new("i", AttrType::Ints),
                AttrInfo::new("f", AttrType::Floats),
                AttrInfo::chars("s", 4),
                AttrInfo::new("d", AttrType::Dates),
            ],
        )
        .unwrap();
        db
    }

    fn insert(values: Vec<Value>) -> KestrelResult<InsertStmt> {
        InsertStmt::create(
            &db(),
            &InsertSqlNode {
                relation_name: "t".to_string(),
                values,
            },
        )
    }

    #[test]
    fn test_coercions() {
        let stmt = insert(vec![
            Value::Float(2.9),
            Value::from("1.5x"),
            Value::Int(42),
            Value::from("2024-02-29"),
        ])
        .unwrap();
        assert_eq!(
            stmt.values(),
            &[
                Value::Int(2),
                Value::Float(1.5),
                Value::from("42"),
                Value::Date(Date::from_ymd(2024, 2, 29).unwrap()),
            ]
        );
    }

    #[test]
    fn test_rejections() {
        let good = || {
            vec![
                Value::Int(1),
                Value::Float(1.0),
                Value::from("a"),
                Value::from("2020-01-01"),
            ]
        };
        let code = |values: Vec<Value>| insert(values).unwrap_err().code();

        assert_eq!(code(vec![Value::Int(1)]), ErrorCode::FieldCountMismatch);
        assert_eq!(code(vec![]), ErrorCode::InvalidArgument);

        let mut values = good();
        values[2] = Value::from("abcde");
        assert_eq!(code(values), ErrorCode::InvalidValue);

        let mut values = good();
        values[3] = Value::from("2023-02-29");
        assert_eq!(code(values), ErrorCode::InvalidValue);

        let mut values = good();
        values[0] = Value::Boolean(true);
        assert_eq!(code(values), ErrorCode::FieldTypeMismatch);

        let missing = InsertStmt::create(
            &db(),
            &InsertSqlNode {
                relation_name: "nope".to_string(),
                values: good(),
            },
        );
        assert_eq!(missing.unwrap_err().code(), ErrorCode::TableNotFound);
    }
}
