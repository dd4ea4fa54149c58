//! DELETE binding.

use std::sync::Arc;

use kestrel_common::KestrelResult;

use super::{lookup_table, BindContext, FilterStmt};
use crate::parser::DeleteSqlNode;
use crate::storage::{Db, Table};

/// A bound DELETE.
#[derive(Debug, Clone)]
pub struct DeleteStmt {
    table: Arc<Table>,
    filter: FilterStmt,
}

impl DeleteStmt {
    /// Binds a DELETE.
    pub fn create(db: &Db, node: &DeleteSqlNode) -> KestrelResult<Self> {
        let table = lookup_table(db, &node.relation_name)?;
        let filter = FilterStmt::create(&BindContext::new(&[Arc::clone(&table)]), &node.conditions)?;
        Ok(Self { table, filter })
    }

    /// Target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// WHERE clause.
    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }
}
