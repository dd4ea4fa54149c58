//! UPDATE binding.

use std::sync::Arc;

use kestrel_common::KestrelResult;

use super::insert::coerce_for_field;
use super::{lookup_field, lookup_table, BindContext, FilterStmt};
use crate::parser::UpdateSqlNode;
use crate::storage::{Db, Table};
use crate::value::Value;

/// A bound single-column UPDATE.
#[derive(Debug, Clone)]
pub struct UpdateStmt {
    table: Arc<Table>,
    field_name: String,
    value: Value,
    filter: FilterStmt,
}

impl UpdateStmt {
    /// Binds an UPDATE. The replacement value is converted to the column
    /// type with the same rules as INSERT.
    pub fn create(db: &Db, node: &UpdateSqlNode) -> KestrelResult<Self> {
        let table = lookup_table(db, &node.relation_name)?;
        let field = lookup_field(&table, &node.attribute_name)?;
        let value = coerce_for_field(table.name(), field.meta(), &node.value)?;
        let filter = FilterStmt::create(&BindContext::new(&[Arc::clone(&table)]), &node.conditions)?;
        Ok(Self {
            table,
            field_name: field.field_name().to_string(),
            value,
            filter,
        })
    }

    /// Target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Column to overwrite.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Replacement value, already of the column type.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// WHERE clause.
    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AttrInfo, CompOp, ConditionSqlNode};
    use crate::value::AttrType;
    use kestrel_common::config::StorageConfig;
    use kestrel_common::ErrorCode;

    fn node(attr: &str, value: Value) -> UpdateSqlNode {
        UpdateSqlNode {
            relation_name: "t".to_string(),
            attribute_name: attr.to_string(),
            value,
            conditions: vec![ConditionSqlNode::attr_value("a", CompOp::EqualTo, 1)],
        }
    }

    #[test]
    fn test_bind_update() {
        let db = Db::new("test", StorageConfig::default());
        db.create_table("t", &[AttrInfo::new("a", AttrType::Ints), AttrInfo::chars("s", 2)])
            .unwrap();

        let stmt = UpdateStmt::create(&db, &node("a", Value::Float(7.8))).unwrap();
        assert_eq!(stmt.value(), &Value::Int(7));
        assert_eq!(stmt.field_name(), "a");
        assert_eq!(stmt.filter().units().len(), 1);

        let err = UpdateStmt::create(&db, &node("z", Value::Int(1))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FieldNotFound);
        let err = UpdateStmt::create(&db, &node("s", Value::from("abc"))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidValue);
    }
}
