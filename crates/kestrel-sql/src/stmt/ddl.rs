//! CREATE TABLE and CREATE INDEX binding.

use std::sync::Arc;

use kestrel_common::{KestrelError, KestrelResult};

use super::lookup_table;
use crate::parser::{AttrInfo, CreateIndexSqlNode, CreateTableSqlNode};
use crate::storage::{Db, Table};

/// A bound CREATE TABLE.
#[derive(Debug, Clone)]
pub struct CreateTableStmt {
    table_name: String,
    attr_infos: Vec<AttrInfo>,
}

impl CreateTableStmt {
    /// Checks the statement shape; column validation happens in the catalog.
    pub fn create(node: &CreateTableSqlNode) -> KestrelResult<Self> {
        if node.relation_name.trim().is_empty() {
            return Err(KestrelError::invalid_argument("table name is empty"));
        }
        if node.attr_infos.is_empty() {
            return Err(KestrelError::invalid_argument(format!(
                "table '{}' has no columns",
                node.relation_name
            )));
        }
        Ok(Self {
            table_name: node.relation_name.clone(),
            attr_infos: node.attr_infos.clone(),
        })
    }

    /// Table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Column definitions.
    pub fn attr_infos(&self) -> &[AttrInfo] {
        &self.attr_infos
    }
}

/// A bound CREATE INDEX.
#[derive(Debug, Clone)]
pub struct CreateIndexStmt {
    table: Arc<Table>,
    index_name: String,
    field_names: Vec<String>,
}

impl CreateIndexStmt {
    /// Resolves the indexed table.
    pub fn create(db: &Db, node: &CreateIndexSqlNode) -> KestrelResult<Self> {
        let table = lookup_table(db, &node.relation_name)?;
        Ok(Self {
            table,
            index_name: node.index_name.clone(),
            field_names: node.attribute_names.clone(),
        })
    }

    /// Indexed table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Index name.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Indexed columns.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }
}
