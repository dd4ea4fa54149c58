//! Logical operators.
//!
//! Every node owns its children. A parent adopts a child by value through
//! [`LogicalOperator::add_child`], so a subtree always has exactly one
//! owner.

use std::fmt;
use std::sync::Arc;

use crate::expr::{Expression, Field};
use crate::storage::Table;
use crate::value::Value;

/// Reads a table, optionally filtering rows with pushed-down predicates.
#[derive(Debug, Clone)]
pub struct TableGetOperator {
    /// Scanned table.
    pub table: Arc<Table>,
    /// Columns the plan needs from this table.
    pub fields: Vec<Field>,
    /// False when rows will be modified in place.
    pub readonly: bool,
    /// Comparisons evaluated during the scan, AND-ed.
    pub predicates: Vec<Expression>,
}

/// Keeps rows for which the expression is true.
#[derive(Debug, Clone)]
pub struct PredicateOperator {
    /// Boolean expression.
    pub expression: Expression,
    /// Input.
    pub children: Vec<LogicalOperator>,
}

/// Cross product of two inputs. The join condition lives in the parent
/// predicate.
#[derive(Debug, Clone, Default)]
pub struct JoinOperator {
    /// Left and right inputs.
    pub children: Vec<LogicalOperator>,
}

/// Folds the input into a single row of aggregates.
#[derive(Debug, Clone)]
pub struct AggregationOperator {
    /// Output expressions: aggregates, and plain columns acting as implicit
    /// group keys.
    pub expressions: Vec<Expression>,
    /// Input.
    pub children: Vec<LogicalOperator>,
}

/// Evaluates the select list.
#[derive(Debug, Clone)]
pub struct ProjectOperator {
    /// Select list in written order.
    pub expressions: Vec<Expression>,
    /// Qualify column names with their table.
    pub multi_table: bool,
    /// Input.
    pub children: Vec<LogicalOperator>,
}

/// Inserts one row.
#[derive(Debug, Clone)]
pub struct InsertOperator {
    /// Target table.
    pub table: Arc<Table>,
    /// Values in column order.
    pub values: Vec<Value>,
}

/// Overwrites one column of every input row.
#[derive(Debug, Clone)]
pub struct UpdateOperator {
    /// Target table.
    pub table: Arc<Table>,
    /// Column to overwrite.
    pub field_name: String,
    /// Replacement value.
    pub value: Value,
    /// Input.
    pub children: Vec<LogicalOperator>,
}

/// Deletes every input row.
#[derive(Debug, Clone)]
pub struct DeleteOperator {
    /// Target table.
    pub table: Arc<Table>,
    /// Input.
    pub children: Vec<LogicalOperator>,
}

/// Describes its child plan instead of running it.
#[derive(Debug, Clone, Default)]
pub struct ExplainOperator {
    /// The explained plan.
    pub children: Vec<LogicalOperator>,
}

/// Logical operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperatorType {
    /// Table read.
    TableGet,
    /// Filter.
    Predicate,
    /// Join.
    Join,
    /// Aggregation.
    Aggregation,
    /// Projection.
    Project,
    /// Insert.
    Insert,
    /// Update.
    Update,
    /// Delete.
    Delete,
    /// Explain.
    Explain,
}

impl fmt::Display for LogicalOperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A node of a logical plan.
#[derive(Debug, Clone)]
pub enum LogicalOperator {
    /// Table read.
    TableGet(TableGetOperator),
    /// Filter.
    Predicate(PredicateOperator),
    /// Join.
    Join(JoinOperator),
    /// Aggregation.
    Aggregation(AggregationOperator),
    /// Projection.
    Project(ProjectOperator),
    /// Insert.
    Insert(InsertOperator),
    /// Update.
    Update(UpdateOperator),
    /// Delete.
    Delete(DeleteOperator),
    /// Explain.
    Explain(ExplainOperator),
}

impl LogicalOperator {
    /// Operator kind.
    pub fn kind(&self) -> LogicalOperatorType {
        match self {
            LogicalOperator::TableGet(_) => LogicalOperatorType::TableGet,
            LogicalOperator::Predicate(_) => LogicalOperatorType::Predicate,
            LogicalOperator::Join(_) => LogicalOperatorType::Join,
            LogicalOperator::Aggregation(_) => LogicalOperatorType::Aggregation,
            LogicalOperator::Project(_) => LogicalOperatorType::Project,
            LogicalOperator::Insert(_) => LogicalOperatorType::Insert,
            LogicalOperator::Update(_) => LogicalOperatorType::Update,
            LogicalOperator::Delete(_) => LogicalOperatorType::Delete,
            LogicalOperator::Explain(_) => LogicalOperatorType::Explain,
        }
    }

    /// Child operators. Leaves return an empty slice.
    pub fn children(&self) -> &[LogicalOperator] {
        match self {
            LogicalOperator::TableGet(_) | LogicalOperator::Insert(_) => &[],
            LogicalOperator::Predicate(op) => &op.children,
            LogicalOperator::Join(op) => &op.children,
            LogicalOperator::Aggregation(op) => &op.children,
            LogicalOperator::Project(op) => &op.children,
            LogicalOperator::Update(op) => &op.children,
            LogicalOperator::Delete(op) => &op.children,
            LogicalOperator::Explain(op) => &op.children,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<LogicalOperator>> {
        match self {
            LogicalOperator::TableGet(_) | LogicalOperator::Insert(_) => None,
            LogicalOperator::Predicate(op) => Some(&mut op.children),
            LogicalOperator::Join(op) => Some(&mut op.children),
            LogicalOperator::Aggregation(op) => Some(&mut op.children),
            LogicalOperator::Project(op) => Some(&mut op.children),
            LogicalOperator::Update(op) => Some(&mut op.children),
            LogicalOperator::Delete(op) => Some(&mut op.children),
            LogicalOperator::Explain(op) => Some(&mut op.children),
        }
    }

    /// Adopts `child` as the last child. Leaves cannot adopt; the child is
    /// handed back.
    pub fn add_child(&mut self, child: LogicalOperator) -> Result<(), LogicalOperator> {
        match self.children_mut() {
            Some(children) => {
                children.push(child);
                Ok(())
            }
            None => Err(child),
        }
    }

    /// Returns true if this operator never has children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            LogicalOperator::TableGet(_) | LogicalOperator::Insert(_)
        )
    }

    /// One-line description used by plan display.
    pub fn describe(&self) -> String {
        match self {
            LogicalOperator::TableGet(op) => {
                let fields: Vec<_> = op.fields.iter().map(|f| f.field_name()).collect();
                let mut line = format!("TableGet: {} [{}]", op.table.name(), fields.join(", "));
                if !op.readonly {
                    line.push_str(" (read-write)");
                }
                if !op.predicates.is_empty() {
                    let predicates: Vec<_> = op.predicates.iter().map(|p| p.name(true)).collect();
                    line.push_str(&format!(" predicates=[{}]", predicates.join(", ")));
                }
                line
            }
            LogicalOperator::Predicate(op) => format!("Predicate: {}", op.expression.name(true)),
            LogicalOperator::Join(_) => "Join".to_string(),
            LogicalOperator::Aggregation(op) => {
                let exprs: Vec<_> = op.expressions.iter().map(|e| e.name(true)).collect();
                format!("Aggregation: {}", exprs.join(", "))
            }
            LogicalOperator::Project(op) => {
                let exprs: Vec<_> = op
                    .expressions
                    .iter()
                    .map(|e| e.name(op.multi_table))
                    .collect();
                format!("Project: {}", exprs.join(", "))
            }
            LogicalOperator::Insert(op) => {
                let values: Vec<_> = op.values.iter().map(|v| v.to_string()).collect();
                format!("Insert: {} ({})", op.table.name(), values.join(", "))
            }
            LogicalOperator::Update(op) => {
                format!("Update: {} SET {} = {}", op.table.name(), op.field_name, op.value)
            }
            LogicalOperator::Delete(op) => format!("Delete: {}", op.table.name()),
            LogicalOperator::Explain(_) => "Explain".to_string(),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
