//! Lowering of logical plans to physical operators.
//!
//! Lowering consumes the logical tree: expressions move into the physical
//! operators, which become their only owner.

use tracing::trace;

use kestrel_common::{KestrelError, KestrelResult};

use super::{
    AggregationPhysicalOperator, DeletePhysicalOperator, ExplainPhysicalOperator,
    InsertPhysicalOperator, NestedLoopJoinPhysicalOperator, PhysicalOperator,
    PredicatePhysicalOperator, ProjectPhysicalOperator, TableScanPhysicalOperator,
    UpdatePhysicalOperator,
};
use crate::logical::{LogicalOperator, LogicalOperatorType, LogicalPlan};

/// Turns a [`LogicalPlan`] into an executable operator tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhysicalPlanGenerator;

impl PhysicalPlanGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self
    }

    /// Lowers `plan`.
    pub fn create(&self, plan: LogicalPlan) -> KestrelResult<Box<dyn PhysicalOperator>> {
        self.lower(plan.into_root())
    }

    fn lower(&self, op: LogicalOperator) -> KestrelResult<Box<dyn PhysicalOperator>> {
        let kind = op.kind();
        trace!(operator = %kind, "lowering logical operator");
        let physical: Box<dyn PhysicalOperator> = match op {
            LogicalOperator::TableGet(get) => Box::new(TableScanPhysicalOperator::new(
                get.table,
                get.readonly,
                get.predicates,
            )),
            LogicalOperator::Predicate(pred) => {
                let child = self.lower_one(kind, pred.children)?;
                Box::new(PredicatePhysicalOperator::new(pred.expression, child))
            }
            LogicalOperator::Join(join) => {
                let mut children = self.lower_all(join.children)?;
                if children.len() != 2 {
                    return Err(arity(kind, "exactly 2", children.len()));
                }
                let right = children.pop();
                let left = children.pop();
                match (left, right) {
                    (Some(left), Some(right)) => {
                        Box::new(NestedLoopJoinPhysicalOperator::new(left, right))
                    }
                    _ => return Err(arity(kind, "exactly 2", 0)),
                }
            }
            LogicalOperator::Aggregation(aggr) => {
                let child = self.lower_one(kind, aggr.children)?;
                Box::new(AggregationPhysicalOperator::new(aggr.expressions, vec![child]))
            }
            LogicalOperator::Project(project) => {
                let child = self.lower_one(kind, project.children)?;
                Box::new(ProjectPhysicalOperator::new(
                    project.expressions,
                    project.multi_table,
                    child,
                ))
            }
            LogicalOperator::Insert(insert) => {
                Box::new(InsertPhysicalOperator::new(insert.table, insert.values))
            }
            LogicalOperator::Update(update) => {
                let child = self.lower_optional(kind, update.children)?;
                Box::new(UpdatePhysicalOperator::new(
                    update.table,
                    update.field_name,
                    update.value,
                    child,
                ))
            }
            LogicalOperator::Delete(delete) => {
                let child = self.lower_optional(kind, delete.children)?;
                Box::new(DeletePhysicalOperator::new(delete.table, child))
            }
            LogicalOperator::Explain(explain) => {
                let child = self.lower_one(kind, explain.children)?;
                Box::new(ExplainPhysicalOperator::new(child))
            }
        };
        Ok(physical)
    }

    fn lower_all(
        &self,
        children: Vec<LogicalOperator>,
    ) -> KestrelResult<Vec<Box<dyn PhysicalOperator>>> {
        children.into_iter().map(|child| self.lower(child)).collect()
    }

    fn lower_one(
        &self,
        kind: LogicalOperatorType,
        children: Vec<LogicalOperator>,
    ) -> KestrelResult<Box<dyn PhysicalOperator>> {
        let count = children.len();
        match self.lower_optional(kind, children)? {
            Some(child) => Ok(child),
            None => Err(arity(kind, "exactly 1", count)),
        }
    }

    fn lower_optional(
        &self,
        kind: LogicalOperatorType,
        children: Vec<LogicalOperator>,
    ) -> KestrelResult<Option<Box<dyn PhysicalOperator>>> {
        if children.len() > 1 {
            return Err(arity(kind, "at most 1", children.len()));
        }
        children.into_iter().next().map(|child| self.lower(child)).transpose()
    }
}

fn arity(kind: LogicalOperatorType, expected: &str, actual: usize) -> KestrelError {
    KestrelError::internal(format!(
        "logical {kind} operator needs {expected} child(ren), has {actual}"
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::expr::Expression;
    use crate::logical::{
        DeleteOperator, JoinOperator, LogicalPlanGenerator, PredicateOperator, ProjectOperator,
        TableGetOperator,
    };
    use crate::parser::{AggrFuncType, AttrInfo, CompOp, ConditionSqlNode, SelectSqlNode, SqlNode};
    use crate::physical::render_plan;
    use crate::stmt::Stmt;
    use crate::storage::{Db, Table};
    use crate::value::{AttrType, Value};
    use kestrel_common::config::{PlannerConfig, StorageConfig};
    use kestrel_common::ErrorCode;

    fn db() -> Db {
        let db = Db::new("test", StorageConfig::default());
        let ints = [AttrInfo::new("a", AttrType::Ints), AttrInfo::new("b", AttrType::Ints)];
        db.create_table("t", &ints).unwrap();
        db.create_table("u", &ints).unwrap();
        db
    }

    fn scan(table: &Arc<Table>) -> LogicalOperator {
        LogicalOperator::TableGet(TableGetOperator {
            table: Arc::clone(table),
            fields: vec![],
            readonly: true,
            predicates: vec![],
        })
    }

    fn lower(db: &Db, node: SqlNode) -> KestrelResult<Box<dyn PhysicalOperator>> {
        let stmt = Stmt::create(db, &node)?;
        let plan = LogicalPlanGenerator::new(&PlannerConfig::default()).create(&stmt)?;
        PhysicalPlanGenerator::new().create(plan)
    }

    #[test]
    fn test_lower_aggregate_with_pushdown() {
        let node = SelectSqlNode::new()
            .aggregate(AggrFuncType::Sum, "b")
            .from("t")
            .filter(ConditionSqlNode::attr_value("a", CompOp::GreatThan, 1));
        let root = lower(&db(), SqlNode::Select(node)).unwrap();
        assert_eq!(
            render_plan(root.as_ref()),
            "PROJECT(SUM(b))\n  AGGREGATION(SUM(b))\n    TABLE_SCAN(t)"
        );
    }

    #[test]
    fn test_lower_explicit_join() {
        let node = SelectSqlNode::new()
            .column("t.a")
            .from("t")
            .join("u", vec![ConditionSqlNode::attr_attr("t.a", CompOp::EqualTo, "u.a")]);
        let root = lower(&db(), SqlNode::Select(node)).unwrap();
        assert_eq!(
            render_plan(root.as_ref()),
            "PROJECT(t.a)\n  PREDICATE(t.a = u.a)\n    NESTED_LOOP_JOIN\n      TABLE_SCAN(t)\n      TABLE_SCAN(u)"
        );
    }

    #[test]
    fn test_join_arity_is_checked() {
        let db = db();
        let t = db.find_table("t").unwrap();
        let join = LogicalOperator::Join(JoinOperator {
            children: vec![scan(&t)],
        });
        let err = PhysicalPlanGenerator::new()
            .create(LogicalPlan::new(join))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_single_child_operators_are_checked() {
        let project = LogicalOperator::Project(ProjectOperator {
            expressions: vec![Expression::Value(Value::Int(1))],
            multi_table: false,
            children: vec![],
        });
        let err = PhysicalPlanGenerator::new()
            .create(LogicalPlan::new(project))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);

        let db = db();
        let t = db.find_table("t").unwrap();
        let filter = LogicalOperator::Predicate(PredicateOperator {
            expression: Expression::Value(Value::Boolean(true)),
            children: vec![scan(&t), scan(&t)],
        });
        let err = PhysicalPlanGenerator::new()
            .create(LogicalPlan::new(filter))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_delete_without_child() {
        let db = db();
        let t = db.find_table("t").unwrap();
        let delete = LogicalOperator::Delete(DeleteOperator {
            table: t,
            children: vec![],
        });
        let root = PhysicalPlanGenerator::new()
            .create(LogicalPlan::new(delete))
            .unwrap();
        assert!(root.children().is_empty());
        assert_eq!(render_plan(root.as_ref()), "DELETE(t)");
    }
}
