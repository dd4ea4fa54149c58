//! EXPLAIN binding.

use kestrel_common::KestrelResult;

use super::Stmt;
use crate::parser::SqlNode;
use crate::storage::Db;

/// EXPLAIN of a bound statement.
#[derive(Debug, Clone)]
pub struct ExplainStmt {
    child: Box<Stmt>,
}

impl ExplainStmt {
    /// Binds the explained statement.
    pub fn create(db: &Db, child: &SqlNode) -> KestrelResult<Self> {
        Ok(Self {
            child: Box::new(Stmt::create(db, child)?),
        })
    }

    /// The explained statement.
    pub fn child(&self) -> &Stmt {
        &self.child
    }
}
