//! Database fixtures.

use std::sync::Arc;

use tracing::debug;

use kestrel_common::config::EngineConfig;
use kestrel_common::{logging, KestrelResult};
use kestrel_sql::executor::{ResultSet, SqlExecutor};
use kestrel_sql::parser::{
    AttrInfo, ConditionSqlNode, CreateTableSqlNode, DeleteSqlNode, InsertSqlNode, SelectSqlNode,
    SqlNode, UpdateSqlNode,
};
use kestrel_sql::storage::Db;
use kestrel_sql::value::{AttrType, Value};

/// An executor over a fresh in-memory database.
#[derive(Debug)]
pub struct TestDb {
    executor: SqlExecutor,
}

impl TestDb {
    /// Empty database with test configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::for_testing())
    }

    /// Empty database with `config`. Logging is installed once per process.
    pub fn with_config(config: EngineConfig) -> Self {
        if logging::init(&config.logging) {
            debug!("installed test subscriber");
        }
        let db = Arc::new(Db::new("kestrel_test", config.storage.clone()));
        Self {
            executor: SqlExecutor::new(db, config),
        }
    }

    /// Database with `t(a int, b int)` holding (1,10), (2,20), (3,30).
    pub fn with_sample_table() -> Self {
        let db = Self::new();
        db.create_int_table("t", &["a", "b"]);
        for (a, b) in [(1, 10), (2, 20), (3, 30)] {
            db.insert("t", vec![Value::Int(a), Value::Int(b)]);
        }
        db
    }

    /// The executor.
    pub fn executor(&self) -> &SqlExecutor {
        &self.executor
    }

    /// The database.
    pub fn db(&self) -> &Arc<Db> {
        self.executor.db()
    }

    /// Runs a statement.
    pub fn execute(&self, node: SqlNode) -> KestrelResult<ResultSet> {
        self.executor.execute(&node)
    }

    /// Runs a SELECT.
    pub fn select(&self, node: SelectSqlNode) -> KestrelResult<ResultSet> {
        self.execute(SqlNode::Select(node))
    }

    /// Creates a table with the given columns.
    ///
    /// # Panics
    ///
    /// Panics if the table cannot be created.
    pub fn create_table(&self, name: &str, attrs: Vec<AttrInfo>) {
        self.execute(SqlNode::CreateTable(CreateTableSqlNode {
            relation_name: name.to_string(),
            attr_infos: attrs,
        }))
        .unwrap_or_else(|e| panic!("create table {name}: {e}"));
    }

    /// Creates a table whose columns are all ints.
    pub fn create_int_table(&self, name: &str, columns: &[&str]) {
        let attrs = columns
            .iter()
            .map(|column| AttrInfo::new(*column, AttrType::Ints))
            .collect();
        self.create_table(name, attrs);
    }

    /// Inserts one row.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub fn insert(&self, table: &str, values: Vec<Value>) {
        self.execute(insert_node(table, values))
            .unwrap_or_else(|e| panic!("insert into {table}: {e}"));
    }

    /// All rows of `table`, columns in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if the select fails.
    pub fn rows(&self, table: &str) -> Vec<Vec<Value>> {
        self.select(SelectSqlNode::new().column("*").from(table))
            .unwrap_or_else(|e| panic!("select from {table}: {e}"))
            .rows
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

/// `INSERT INTO table VALUES (...)`
pub fn insert_node(table: &str, values: Vec<Value>) -> SqlNode {
    SqlNode::Insert(InsertSqlNode {
        relation_name: table.to_string(),
        values,
    })
}

/// `UPDATE table SET attribute = value WHERE ...`
pub fn update_node(
    table: &str,
    attribute: &str,
    value: Value,
    conditions: Vec<ConditionSqlNode>,
) -> SqlNode {
    SqlNode::Update(UpdateSqlNode {
        relation_name: table.to_string(),
        attribute_name: attribute.to_string(),
        value,
        conditions,
    })
}

/// `DELETE FROM table WHERE ...`
pub fn delete_node(table: &str, conditions: Vec<ConditionSqlNode>) -> SqlNode {
    SqlNode::Delete(DeleteSqlNode {
        relation_name: table.to_string(),
        conditions,
    })
}
