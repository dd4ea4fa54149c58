//! The statement executor.

use std::sync::Arc;

use tracing::{debug, info, warn};

use kestrel_common::config::EngineConfig;
use kestrel_common::constants::{EXPLAIN_COLUMN, FIXED_FIELD_LEN};
use kestrel_common::{ErrorCode, KestrelError, KestrelResult};

use super::result::{ResultColumn, ResultSet};
use crate::expr::Expression;
use crate::logical::{LogicalOperator, LogicalPlanGenerator};
use crate::parser::SqlNode;
use crate::physical::{Next, PhysicalOperator, PhysicalPlanGenerator};
use crate::stmt::Stmt;
use crate::storage::{Db, TrxManager};
use crate::value::AttrType;

/// Runs statements against one database.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use kestrel_common::config::EngineConfig;
/// use kestrel_sql::executor::SqlExecutor;
/// use kestrel_sql::parser::{AttrInfo, CreateTableSqlNode, InsertSqlNode, SelectSqlNode, SqlNode};
/// use kestrel_sql::storage::Db;
/// use kestrel_sql::value::{AttrType, Value};
///
/// let config = EngineConfig::default();
/// let db = Arc::new(Db::new("demo", config.storage.clone()));
/// let executor = SqlExecutor::new(db, config);
///
/// executor
///     .execute(&SqlNode::CreateTable(CreateTableSqlNode {
///         relation_name: "t".to_string(),
///         attr_infos: vec![AttrInfo::new("a", AttrType::Ints)],
///     }))
///     .unwrap();
/// executor
///     .execute(&SqlNode::Insert(InsertSqlNode {
///         relation_name: "t".to_string(),
///         values: vec![Value::Int(7)],
///     }))
///     .unwrap();
///
/// let result = executor
///     .execute(&SqlNode::Select(SelectSqlNode::new().column("a").from("t")))
///     .unwrap();
/// assert_eq!(result.to_text(), "a\n7");
/// ```
#[derive(Debug)]
pub struct SqlExecutor {
    db: Arc<Db>,
    trx_manager: TrxManager,
    config: EngineConfig,
}

impl SqlExecutor {
    /// Creates an executor over `db`.
    pub fn new(db: Arc<Db>, config: EngineConfig) -> Self {
        Self {
            db,
            trx_manager: TrxManager::new(),
            config,
        }
    }

    /// The database.
    pub fn db(&self) -> &Arc<Db> {
        &self.db
    }

    /// The configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Binds, plans and runs one statement.
    pub fn execute(&self, node: &SqlNode) -> KestrelResult<ResultSet> {
        let stmt = Stmt::create(&self.db, node)?;
        debug!(statement = stmt.kind(), "bound statement");
        match &stmt {
            Stmt::CreateTable(create) => {
                self.db.create_table(create.table_name(), create.attr_infos())?;
                Ok(ResultSet::default())
            }
            Stmt::CreateIndex(create) => {
                let index = create
                    .table()
                    .create_index(create.index_name(), create.field_names())?;
                info!(table = create.table().name(), index = %index, "created index");
                Ok(ResultSet::default())
            }
            _ => self.run(&stmt),
        }
    }

    /// Runs a statement and reports a status code with either the rendered
    /// result or the error message.
    pub fn run_to_text(&self, node: &SqlNode) -> (ErrorCode, String) {
        match self.execute(node) {
            Ok(result) => (ErrorCode::Success, result.to_text()),
            Err(e) => {
                warn!(code = %e.code(), error = %e, "statement failed");
                (e.code(), e.to_string())
            }
        }
    }

    fn run(&self, stmt: &Stmt) -> KestrelResult<ResultSet> {
        let plan = LogicalPlanGenerator::new(&self.config.planner).create(stmt)?;
        debug!(plan = %plan.display().trim_end(), "logical plan");
        let mut result = ResultSet::new(result_columns(plan.root()));
        let mut root = PhysicalPlanGenerator::new().create(plan)?;

        let trx = self.trx_manager.begin();
        let limit = self.config.execution.max_result_rows;
        let outcome = root
            .open(&trx)
            .and_then(|()| collect(root.as_mut(), limit, &mut result));
        let closed = root.close();
        if let (Err(_), Err(close_err)) = (&outcome, &closed) {
            warn!(error = %close_err, "close failed after execution error");
        }
        outcome?;
        closed?;

        result.affected_rows = root.affected_rows();
        debug!(
            statement = stmt.kind(),
            rows = result.rows.len(),
            affected = result.affected_rows,
            truncated = result.truncated,
            "statement finished"
        );
        Ok(result)
    }
}

/// Pulls rows from `root` until end-of-stream or `limit` rows (0 = no limit).
fn collect(
    root: &mut dyn PhysicalOperator,
    limit: usize,
    result: &mut ResultSet,
) -> KestrelResult<()> {
    while root.next()? == Next::Tuple {
        if limit > 0 && result.rows.len() >= limit {
            result.truncated = true;
            break;
        }
        let tuple = root.current_tuple().ok_or_else(|| {
            warn!(operator = %root.kind(), "root produced no tuple");
            KestrelError::internal(format!("{} produced no current tuple", root.kind()))
        })?;
        result.rows.push(tuple.values()?);
    }
    Ok(())
}

/// Header for the rows the plan produces.
fn result_columns(root: &LogicalOperator) -> Vec<ResultColumn> {
    match root {
        LogicalOperator::Project(project) => project
            .expressions
            .iter()
            .map(|expr| {
                let length = match expr {
                    Expression::Field(field) => field.meta().len(),
                    _ => FIXED_FIELD_LEN,
                };
                ResultColumn::new(expr.name(project.multi_table), expr.value_type(), length)
            })
            .collect(),
        LogicalOperator::Explain(_) => {
            vec![ResultColumn::new(EXPLAIN_COLUMN, AttrType::Chars, 0)]
        }
        _ => Vec::new(),
    }
}
