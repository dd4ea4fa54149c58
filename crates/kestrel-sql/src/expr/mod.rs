//! Expressions evaluated over tuples.
//!
//! ```text
//!   Expression
//!   ├── Field        column reference, bound to a table
//!   ├── Value        literal
//!   ├── Comparison   left <op> right          -> boolean
//!   ├── Conjunction  AND / OR over children   -> boolean
//!   └── Aggregation  FUNC(col) / COUNT(*)     -> read back by alias
//! ```
//!
//! Expression trees are owned by exactly one plan node. Moving a node moves
//! its expressions; nothing is shared by reference.

mod aggregation;
mod comparison;
mod field;

use std::fmt;

use kestrel_common::{KestrelError, KestrelResult};

pub use aggregation::{AggrTarget, AggregationExpr};
pub use comparison::{ComparisonExpr, ConjunctionExpr, ConjunctionType};
pub use field::Field;

use crate::executor::tuple::{Tuple, TupleCellSpec};
use crate::value::{AttrType, Value};

/// Expression kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprType {
    /// Column reference.
    Field,
    /// Literal.
    Value,
    /// Comparison.
    Comparison,
    /// AND / OR.
    Conjunction,
    /// Aggregate.
    Aggregation,
}

/// An expression node.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Column reference.
    Field(Field),
    /// Literal.
    Value(Value),
    /// Comparison.
    Comparison(ComparisonExpr),
    /// AND / OR.
    Conjunction(ConjunctionExpr),
    /// Aggregate.
    Aggregation(AggregationExpr),
}

impl Expression {
    /// The expression kind.
    pub fn expr_type(&self) -> ExprType {
        match self {
            Expression::Field(_) => ExprType::Field,
            Expression::Value(_) => ExprType::Value,
            Expression::Comparison(_) => ExprType::Comparison,
            Expression::Conjunction(_) => ExprType::Conjunction,
            Expression::Aggregation(_) => ExprType::Aggregation,
        }
    }

    /// Evaluates the expression against a tuple.
    pub fn get_value(&self, tuple: &Tuple) -> KestrelResult<Value> {
        match self {
            Expression::Field(field) => tuple.find_cell(&field.cell_spec())?.ok_or_else(|| {
                KestrelError::field_not_found(field.table_name(), field.field_name())
            }),
            Expression::Value(value) => Ok(value.clone()),
            Expression::Comparison(cmp) => cmp.evaluate(tuple),
            Expression::Conjunction(conj) => conj.evaluate(tuple),
            Expression::Aggregation(aggr) => aggr.evaluate(tuple),
        }
    }

    /// Type of the value the expression produces.
    pub fn value_type(&self) -> AttrType {
        match self {
            Expression::Field(field) => field.attr_type(),
            Expression::Value(value) => value.attr_type(),
            Expression::Comparison(_) | Expression::Conjunction(_) => AttrType::Booleans,
            Expression::Aggregation(aggr) => aggr.value_type(),
        }
    }

    /// Display name; columns are qualified when `with_table` is set.
    pub fn name(&self, with_table: bool) -> String {
        match self {
            Expression::Field(field) => field.name(with_table),
            Expression::Value(value) => match value {
                Value::Chars(s) => format!("'{s}'"),
                other => other.to_string(),
            },
            Expression::Comparison(cmp) => cmp.to_string(),
            Expression::Conjunction(conj) => conj.to_string(),
            Expression::Aggregation(aggr) => aggr.alias().to_string(),
        }
    }

    /// Spec of the cell this expression yields in a projected tuple.
    pub fn cell_spec(&self, with_table: bool) -> TupleCellSpec {
        match self {
            Expression::Field(field) => TupleCellSpec::with_alias(
                field.table_name(),
                field.field_name(),
                field.name(with_table),
            ),
            Expression::Aggregation(aggr) => aggr.cell_spec(),
            other => TupleCellSpec::from_alias(other.name(with_table)),
        }
    }
}

impl From<Field> for Expression {
    fn from(field: Field) -> Self {
        Expression::Field(field)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Value(value)
    }
}

impl From<ComparisonExpr> for Expression {
    fn from(cmp: ComparisonExpr) -> Self {
        Expression::Comparison(cmp)
    }
}

impl From<AggregationExpr> for Expression {
    fn from(aggr: AggregationExpr) -> Self {
        Expression::Aggregation(aggr)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name(true))
    }
}
