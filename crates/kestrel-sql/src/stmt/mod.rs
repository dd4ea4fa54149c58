//! Statement binding.
//!
//! Binding turns parse-tree nodes into statements whose table and column
//! references are resolved against a [`Db`]. Everything downstream (the
//! logical planner, lowering, operators) works only with bound statements.
//!
//! ```text
//!   SqlNode ──Stmt::create(db)──► Stmt
//!                                  ├── Select  (tables, select list, joins, WHERE)
//!                                  ├── Insert  (table, coerced values)
//!                                  ├── Update  (table, column, coerced value, WHERE)
//!                                  ├── Delete  (table, WHERE)
//!                                  ├── CreateTable / CreateIndex
//!                                  └── Explain (bound child)
//! ```

mod ddl;
mod delete;
mod explain;
mod filter;
mod insert;
mod select;
mod update;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use kestrel_common::{KestrelError, KestrelResult};

pub use ddl::{CreateIndexStmt, CreateTableStmt};
pub use delete::DeleteStmt;
pub use explain::ExplainStmt;
pub use filter::{FilterObj, FilterStmt, FilterUnit};
pub use insert::InsertStmt;
pub use select::{JoinStmt, SelectStmt};
pub use update::UpdateStmt;

pub(crate) use filter::units_to_conjunction;

use crate::expr::Field;
use crate::parser::{RelAttrSqlNode, SqlNode};
use crate::storage::{Db, Table};

/// A bound statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// SELECT
    Select(SelectStmt),
    /// INSERT
    Insert(InsertStmt),
    /// UPDATE
    Update(UpdateStmt),
    /// DELETE
    Delete(DeleteStmt),
    /// CREATE TABLE
    CreateTable(CreateTableStmt),
    /// CREATE INDEX
    CreateIndex(CreateIndexStmt),
    /// EXPLAIN
    Explain(ExplainStmt),
}

impl Stmt {
    /// Binds a parsed statement.
    pub fn create(db: &Db, node: &SqlNode) -> KestrelResult<Stmt> {
        match node {
            SqlNode::Select(select) => SelectStmt::create(db, select).map(Stmt::Select),
            SqlNode::Insert(insert) => InsertStmt::create(db, insert).map(Stmt::Insert),
            SqlNode::Update(update) => UpdateStmt::create(db, update).map(Stmt::Update),
            SqlNode::Delete(delete) => DeleteStmt::create(db, delete).map(Stmt::Delete),
            SqlNode::CreateTable(create) => {
                CreateTableStmt::create(create).map(Stmt::CreateTable)
            }
            SqlNode::CreateIndex(create) => {
                CreateIndexStmt::create(db, create).map(Stmt::CreateIndex)
            }
            SqlNode::Explain(child) => ExplainStmt::create(db, child).map(Stmt::Explain),
        }
    }

    /// Statement kind, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::Select(_) => "SELECT",
            Stmt::Insert(_) => "INSERT",
            Stmt::Update(_) => "UPDATE",
            Stmt::Delete(_) => "DELETE",
            Stmt::CreateTable(_) => "CREATE TABLE",
            Stmt::CreateIndex(_) => "CREATE INDEX",
            Stmt::Explain(_) => "EXPLAIN",
        }
    }
}

/// Tables in scope while binding one statement.
#[derive(Debug, Clone, Default)]
pub(crate) struct BindContext {
    tables: Vec<Arc<Table>>,
    by_name: HashMap<String, Arc<Table>>,
}

impl BindContext {
    pub(crate) fn new(tables: &[Arc<Table>]) -> Self {
        let by_name = tables
            .iter()
            .map(|table| (table.name().to_string(), Arc::clone(table)))
            .collect();
        Self {
            tables: tables.to_vec(),
            by_name,
        }
    }

    /// The table unqualified names resolve to; only set when exactly one
    /// table is in scope.
    pub(crate) fn default_table(&self) -> Option<&Arc<Table>> {
        match self.tables.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub(crate) fn first_table(&self) -> Option<&Arc<Table>> {
        self.tables.first()
    }

    pub(crate) fn find(&self, name: &str) -> Option<&Arc<Table>> {
        self.by_name.get(name)
    }

    /// Resolves the table part of an attribute.
    pub(crate) fn resolve_table(&self, attr: &RelAttrSqlNode) -> KestrelResult<Arc<Table>> {
        if attr.relation_name.is_empty() {
            return self.default_table().cloned().ok_or_else(|| {
                warn!(attr = %attr, "cannot tell which table an unqualified attribute belongs to");
                KestrelError::field_not_found("", &attr.attribute_name)
            });
        }
        self.find(&attr.relation_name).cloned().ok_or_else(|| {
            warn!(table = %attr.relation_name, "no such table in scope");
            KestrelError::table_not_found(&attr.relation_name)
        })
    }

    /// Resolves an attribute to a visible column.
    pub(crate) fn resolve_field(&self, attr: &RelAttrSqlNode) -> KestrelResult<Field> {
        let table = self.resolve_table(attr)?;
        lookup_field(&table, &attr.attribute_name)
    }
}

/// Finds a visible column of `table`.
pub(crate) fn lookup_field(table: &Arc<Table>, name: &str) -> KestrelResult<Field> {
    match table
        .table_meta()
        .field_by_name(name)
        .filter(|meta| meta.visible())
    {
        Some(meta) => Ok(Field::new(Arc::clone(table), meta.clone())),
        None => {
            warn!(table = table.name(), field = name, "no such field");
            Err(KestrelError::field_not_found(table.name(), name))
        }
    }
}

/// Finds a table in the catalog.
pub(crate) fn lookup_table(db: &Db, name: &str) -> KestrelResult<Arc<Table>> {
    if name.trim().is_empty() {
        return Err(KestrelError::invalid_argument("relation name is empty"));
    }
    db.find_table(name).ok_or_else(|| {
        warn!(db = db.name(), table = name, "no such table");
        KestrelError::table_not_found(name)
    })
}

/// All visible columns of `table` in schema order.
pub fn visible_fields(table: &Arc<Table>) -> Vec<Field> {
    table
        .table_meta()
        .user_fields()
        .iter()
        .filter(|meta| meta.visible())
        .map(|meta| Field::new(Arc::clone(table), meta.clone()))
        .collect()
}
