//! Logical plan generation.
//!
//! SELECT plans are shaped as:
//!
//! ```text
//!   Project (select list, always the root)
//!     Aggregation (only when the select list has aggregates)
//!       Predicate (remaining WHERE units)
//!         Predicate (ON of join n)          explicit joins
//!           Join                              or
//!             ...                           Join (comma FROM, cross product)
//!               TableGet (pushed predicates)
//! ```
//!
//! The generator only reads the bound statement; expressions are cloned into
//! the new tree, so a failed generation leaves nothing half-built.

use std::sync::Arc;

use tracing::{debug, warn};

use kestrel_common::config::PlannerConfig;
use kestrel_common::{KestrelError, KestrelResult};

use super::operator::*;
use super::plan::LogicalPlan;
use super::pushdown::split_pushable;
use crate::expr::{Expression, Field};
use crate::stmt::{
    units_to_conjunction, visible_fields, DeleteStmt, ExplainStmt, FilterStmt, InsertStmt,
    SelectStmt, Stmt, UpdateStmt,
};
use crate::storage::Table;

/// Compiles bound statements into logical plans.
#[derive(Debug, Clone)]
pub struct LogicalPlanGenerator {
    enable_predicate_pushdown: bool,
}

impl Default for LogicalPlanGenerator {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

impl LogicalPlanGenerator {
    /// Creates a generator.
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            enable_predicate_pushdown: config.enable_predicate_pushdown,
        }
    }

    /// Builds the plan for a statement.
    pub fn create(&self, stmt: &Stmt) -> KestrelResult<LogicalPlan> {
        let root = self.create_operator(stmt)?;
        debug!(kind = %root.kind(), "generated logical plan");
        Ok(LogicalPlan::new(root))
    }

    fn create_operator(&self, stmt: &Stmt) -> KestrelResult<LogicalOperator> {
        match stmt {
            Stmt::Select(select) => self.create_select(select),
            Stmt::Insert(insert) => Ok(create_insert(insert)),
            Stmt::Update(update) => Ok(create_update(update)),
            Stmt::Delete(delete) => Ok(create_delete(delete)),
            Stmt::Explain(explain) => self.create_explain(explain),
            Stmt::CreateTable(_) | Stmt::CreateIndex(_) => Err(KestrelError::unimplemented(
                format!("logical plan for {}", stmt.kind()),
            )),
        }
    }

    fn create_select(&self, select: &SelectStmt) -> KestrelResult<LogicalOperator> {
        let query_exprs = select.query_exprs();
        let mut remaining = select.filter().units().to_vec();
        let mut aggr_exprs = Vec::new();
        let mut has_plain_field = false;
        let mut table_oper: Option<LogicalOperator> = None;

        for (i, table) in select.tables().iter().enumerate() {
            let mut fields = Vec::new();
            for expr in query_exprs {
                match expr {
                    Expression::Field(field) => {
                        has_plain_field = true;
                        if field.table_name() == table.name() {
                            fields.push(field.clone());
                        }
                    }
                    Expression::Aggregation(aggr) => {
                        if aggr.table_name() == table.name() {
                            if let Some(field) = aggr.field() {
                                fields.push(field.clone());
                            }
                            aggr_exprs.push(expr.clone());
                        }
                    }
                    other => {
                        return Err(KestrelError::internal(format!(
                            "select item '{}' is neither a column nor an aggregate",
                            other.name(true)
                        )));
                    }
                }
            }

            let predicates = if self.enable_predicate_pushdown {
                let (pushed, rest) = split_pushable(table.name(), remaining);
                remaining = rest;
                pushed
            } else {
                Vec::new()
            };
            let table_get = table_get(table, fields, true, predicates);

            table_oper = Some(match table_oper {
                None => table_get,
                Some(left) => {
                    let join = LogicalOperator::Join(JoinOperator {
                        children: vec![left, table_get],
                    });
                    if select.joins().is_empty() {
                        join
                    } else {
                        let condition = select
                            .joins()
                            .get(i - 1)
                            .map(|join| join.condition())
                            .ok_or_else(|| {
                                KestrelError::internal(format!("no join clause for table {i}"))
                            })?;
                        wrap_in_predicate(condition, join)
                    }
                }
            });
        }

        let Some(mut child) = table_oper else {
            return Err(KestrelError::invalid_argument("SELECT without tables"));
        };

        if let Some(expression) = units_to_conjunction(
            remaining.iter().map(|unit| unit.to_expression()).collect(),
        ) {
            child = LogicalOperator::Predicate(PredicateOperator {
                expression,
                children: vec![child],
            });
        }

        if !aggr_exprs.is_empty() {
            if has_plain_field {
                warn!("aggregates mixed with plain columns without GROUP BY");
                return Err(KestrelError::invalid_argument(
                    "aggregates cannot be mixed with plain columns without GROUP BY",
                ));
            }
            child = LogicalOperator::Aggregation(AggregationOperator {
                expressions: aggr_exprs,
                children: vec![child],
            });
        }

        Ok(LogicalOperator::Project(ProjectOperator {
            expressions: query_exprs.to_vec(),
            multi_table: select.multi_table(),
            children: vec![child],
        }))
    }

    fn create_explain(&self, explain: &ExplainStmt) -> KestrelResult<LogicalOperator> {
        let child = self.create_operator(explain.child()).map_err(|e| {
            warn!(error = %e, "failed to create explain's child plan");
            e
        })?;
        Ok(LogicalOperator::Explain(ExplainOperator {
            children: vec![child],
        }))
    }
}

fn table_get(
    table: &Arc<Table>,
    fields: Vec<Field>,
    readonly: bool,
    predicates: Vec<Expression>,
) -> LogicalOperator {
    LogicalOperator::TableGet(TableGetOperator {
        table: Arc::clone(table),
        fields,
        readonly,
        predicates,
    })
}

/// Puts `child` under a predicate holding `filter`, or returns it unchanged
/// when the filter is empty.
fn wrap_in_predicate(filter: &FilterStmt, child: LogicalOperator) -> LogicalOperator {
    match filter.to_expression() {
        Some(expression) => LogicalOperator::Predicate(PredicateOperator {
            expression,
            children: vec![child],
        }),
        None => child,
    }
}

fn create_insert(insert: &InsertStmt) -> LogicalOperator {
    LogicalOperator::Insert(InsertOperator {
        table: Arc::clone(insert.table()),
        values: insert.values().to_vec(),
    })
}

fn create_update(update: &UpdateStmt) -> LogicalOperator {
    let table = update.table();
    let scan = table_get(table, visible_fields(table), false, Vec::new());
    LogicalOperator::Update(UpdateOperator {
        table: Arc::clone(table),
        field_name: update.field_name().to_string(),
        value: update.value().clone(),
        children: vec![wrap_in_predicate(update.filter(), scan)],
    })
}

fn create_delete(delete: &DeleteStmt) -> LogicalOperator {
    let table = delete.table();
    let scan = table_get(table, visible_fields(table), false, Vec::new());
    LogicalOperator::Delete(DeleteOperator {
        table: Arc::clone(table),
        children: vec![wrap_in_predicate(delete.filter(), scan)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AggrFuncType, AttrInfo, CompOp, ConditionSqlNode, SelectSqlNode, SqlNode, UpdateSqlNode};
    use crate::storage::Db;
    use crate::value::{AttrType, Value};
    use kestrel_common::config::StorageConfig;
    use kestrel_common::ErrorCode;

    fn db() -> Db {
        let db = Db::new("test", StorageConfig::default());
        let ints = |names: &[&str]| -> Vec<AttrInfo> {
            names.iter().map(|n| AttrInfo::new(*n, AttrType::Ints)).collect()
        };
        db.create_table("t", &ints(&["a", "b"])).unwrap();
        db.create_table("u", &ints(&["a", "c"])).unwrap();
        db.create_table("v", &ints(&["a", "d"])).unwrap();
        db
    }

    fn plan(db: &Db, node: SqlNode, pushdown: bool) -> KestrelResult<LogicalPlan> {
        let stmt = Stmt::create(db, &node)?;
        let config = PlannerConfig {
            enable_predicate_pushdown: pushdown,
        };
        LogicalPlanGenerator::new(&config).create(&stmt)
    }

    fn lines(plan: &LogicalPlan) -> Vec<String> {
        plan.display().lines().map(str::to_string).collect()
    }

    #[test]
    fn test_sum_with_pushdown() {
        let node = SelectSqlNode::new()
            .aggregate(AggrFuncType::Sum, "b")
            .from("t")
            .filter(ConditionSqlNode::attr_value("a", CompOp::GreatThan, 1));
        let plan = plan(&db(), SqlNode::Select(node), true).unwrap();
        assert_eq!(
            lines(&plan),
            vec![
                "Project: SUM(b)",
                "  Aggregation: SUM(b)",
                "    TableGet: t [b] predicates=[t.a > 1]",
            ]
        );
    }

    #[test]
    fn test_pushdown_disabled_keeps_filter() {
        let node = SelectSqlNode::new()
            .column("a")
            .from("t")
            .filter(ConditionSqlNode::attr_value("a", CompOp::GreatThan, 1));
        let plan = plan(&db(), SqlNode::Select(node), false).unwrap();
        assert_eq!(
            lines(&plan),
            vec!["Project: a", "  Predicate: t.a > 1", "    TableGet: t [a]"]
        );
    }

    #[test]
    fn test_pushdown_is_exclusive() {
        let node = SelectSqlNode::new()
            .column("t.b")
            .column("u.c")
            .from("t")
            .from("u")
            .filter(ConditionSqlNode::value_attr(3, CompOp::GreatEqual, "u.c"))
            .filter(ConditionSqlNode::attr_attr("t.a", CompOp::EqualTo, "u.a"))
            .filter(ConditionSqlNode::attr_value("t.b", CompOp::NotEqual, 0));
        let plan = plan(&db(), SqlNode::Select(node), true).unwrap();
        assert_eq!(
            lines(&plan),
            vec![
                "Project: t.b, u.c",
                "  Predicate: t.a = u.a",
                "    Join",
                "      TableGet: t [b] predicates=[t.b <> 0]",
                "      TableGet: u [c] predicates=[3 >= u.c]",
            ]
        );
    }

    #[test]
    fn test_explicit_joins_wrap_each_pair() {
        let node = SelectSqlNode::new()
            .column("*")
            .from("t")
            .join("u", vec![ConditionSqlNode::attr_attr("t.a", CompOp::EqualTo, "u.a")])
            .join("v", vec![ConditionSqlNode::attr_attr("u.a", CompOp::EqualTo, "v.a")]);
        let plan = plan(&db(), SqlNode::Select(node), true).unwrap();
        assert_eq!(
            lines(&plan),
            vec![
                "Project: t.a, t.b, u.a, u.c, v.a, v.d",
                "  Predicate: u.a = v.a",
                "    Join",
                "      Predicate: t.a = u.a",
                "        Join",
                "          TableGet: t [a, b]",
                "          TableGet: u [a, c]",
                "      TableGet: v [a, d]",
            ]
        );
    }

    #[test]
    fn test_update_plan() {
        let node = SqlNode::Update(UpdateSqlNode {
            relation_name: "t".to_string(),
            attribute_name: "b".to_string(),
            value: Value::Int(9),
            conditions: vec![ConditionSqlNode::attr_value("a", CompOp::EqualTo, 2)],
        });
        let plan = plan(&db(), node, true).unwrap();
        assert_eq!(
            lines(&plan),
            vec![
                "Update: t SET b = 9",
                "  Predicate: t.a = 2",
                "    TableGet: t [a, b] (read-write)",
            ]
        );
    }

    #[test]
    fn test_explain_wraps_child() {
        let node = SqlNode::Select(SelectSqlNode::new().column("a").from("t")).explain();
        let plan = plan(&db(), node, true).unwrap();
        assert_eq!(plan.root().kind(), LogicalOperatorType::Explain);
        assert_eq!(plan.root().children()[0].kind(), LogicalOperatorType::Project);
    }

    #[test]
    fn test_ddl_has_no_plan() {
        let node = SqlNode::CreateTable(crate::parser::CreateTableSqlNode {
            relation_name: "w".to_string(),
            attr_infos: vec![AttrInfo::new("x", AttrType::Ints)],
        });
        let err = plan(&db(), node, true).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unimplemented);
    }

    #[test]
    fn test_leaves_refuse_children() {
        let plan = plan(
            &db(),
            SqlNode::Select(SelectSqlNode::new().column("a").from("t")),
            true,
        )
        .unwrap();
        let mut scan = plan.root().children()[0].clone();
        assert!(scan.is_leaf());
        assert!(scan.add_child(plan.into_root()).is_err());
    }
}
