//! WHERE and ON clauses.

use std::fmt;

use kestrel_common::KestrelResult;

use super::BindContext;
use crate::expr::{ComparisonExpr, ConjunctionExpr, ConjunctionType, Expression, Field};
use crate::parser::{CompOp, ConditionOperand, ConditionSqlNode};
use crate::value::Value;

/// One operand of a filter unit.
#[derive(Debug, Clone)]
pub enum FilterObj {
    /// A bound column.
    Attr(Field),
    /// A literal.
    Value(Value),
}

impl FilterObj {
    /// Builds the expression for this operand.
    pub fn to_expression(&self) -> Expression {
        match self {
            FilterObj::Attr(field) => Expression::Field(field.clone()),
            FilterObj::Value(value) => Expression::Value(value.clone()),
        }
    }
}

impl fmt::Display for FilterObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression().name(true))
    }
}

/// `left <op> right` with bound operands.
#[derive(Debug, Clone)]
pub struct FilterUnit {
    left: FilterObj,
    comp: CompOp,
    right: FilterObj,
}

impl FilterUnit {
    /// Creates a unit.
    pub fn new(left: FilterObj, comp: CompOp, right: FilterObj) -> Self {
        Self { left, comp, right }
    }

    /// Left operand.
    pub fn left(&self) -> &FilterObj {
        &self.left
    }

    /// Operator.
    pub fn comp(&self) -> CompOp {
        self.comp
    }

    /// Right operand.
    pub fn right(&self) -> &FilterObj {
        &self.right
    }

    /// If exactly one side is a column and the other a literal, returns the
    /// name of the column's table.
    pub fn single_table(&self) -> Option<&str> {
        match (&self.left, &self.right) {
            (FilterObj::Attr(field), FilterObj::Value(_))
            | (FilterObj::Value(_), FilterObj::Attr(field)) => Some(field.table_name()),
            _ => None,
        }
    }

    /// Builds the comparison expression for this unit.
    pub fn to_expression(&self) -> Expression {
        Expression::Comparison(ComparisonExpr::new(
            self.comp,
            self.left.to_expression(),
            self.right.to_expression(),
        ))
    }
}

impl fmt::Display for FilterUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.comp, self.right)
    }
}

/// A conjunction of filter units.
#[derive(Debug, Clone, Default)]
pub struct FilterStmt {
    units: Vec<FilterUnit>,
}

impl FilterStmt {
    /// Binds conditions against the tables in scope.
    pub(crate) fn create(ctx: &BindContext, conditions: &[ConditionSqlNode]) -> KestrelResult<Self> {
        let units = conditions
            .iter()
            .map(|condition| {
                Ok(FilterUnit::new(
                    bind_operand(ctx, &condition.left)?,
                    condition.comp,
                    bind_operand(ctx, &condition.right)?,
                ))
            })
            .collect::<KestrelResult<Vec<_>>>()?;
        Ok(Self { units })
    }

    /// Units in written order.
    pub fn units(&self) -> &[FilterUnit] {
        &self.units
    }

    /// Returns true when there is nothing to filter on.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// AND of every unit, or `None` when empty.
    pub fn to_expression(&self) -> Option<Expression> {
        units_to_conjunction(self.units.iter().map(FilterUnit::to_expression).collect())
    }
}

/// Wraps comparison expressions in one AND, or `None` when there are none.
pub(crate) fn units_to_conjunction(children: Vec<Expression>) -> Option<Expression> {
    if children.is_empty() {
        return None;
    }
    Some(Expression::Conjunction(ConjunctionExpr::new(
        ConjunctionType::And,
        children,
    )))
}

fn bind_operand(ctx: &BindContext, operand: &ConditionOperand) -> KestrelResult<FilterObj> {
    match operand {
        ConditionOperand::Attr(attr) => ctx.resolve_field(attr).map(FilterObj::Attr),
        ConditionOperand::Value(value) => Ok(FilterObj::Value(value.clone())),
    }
}
