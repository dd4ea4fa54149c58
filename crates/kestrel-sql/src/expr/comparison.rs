//! Comparison and conjunction expressions.

use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use kestrel_common::KestrelResult;

use super::Expression;
use crate::executor::tuple::Tuple;
use crate::parser::CompOp;
use crate::value::Value;

/// `left <op> right`
#[derive(Debug, Clone)]
pub struct ComparisonExpr {
    comp: CompOp,
    left: Box<Expression>,
    right: Box<Expression>,
}

impl ComparisonExpr {
    /// Creates a comparison.
    pub fn new(comp: CompOp, left: Expression, right: Expression) -> Self {
        Self {
            comp,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// The operator.
    pub fn comp(&self) -> CompOp {
        self.comp
    }

    /// Left operand.
    pub fn left(&self) -> &Expression {
        &self.left
    }

    /// Right operand.
    pub fn right(&self) -> &Expression {
        &self.right
    }

    /// Applies the operator to two values.
    ///
    /// `LIKE` on non-text operands is an error. Other pairs with no defined
    /// ordering take the -1 of [`Value::compare`] and so order as less:
    /// `<>`, `<` and `<=` hold while `=`, `>` and `>=` do not.
    pub fn compare_value(&self, left: &Value, right: &Value) -> KestrelResult<bool> {
        match self.comp {
            CompOp::Like => left.like_match(right),
            CompOp::NotLike => left.like_match(right).map(|matched| !matched),
            comp => {
                let ordering = left.compare_with(right).unwrap_or_else(|| {
                    trace!(%left, %right, %comp, "incomparable operands");
                    Ordering::Less
                });
                Ok(holds(comp, ordering))
            }
        }
    }

    pub(super) fn evaluate(&self, tuple: &Tuple) -> KestrelResult<Value> {
        let left = self.left.get_value(tuple)?;
        let right = self.right.get_value(tuple)?;
        self.compare_value(&left, &right).map(Value::Boolean)
    }
}

fn holds(comp: CompOp, ordering: Ordering) -> bool {
    match comp {
        CompOp::EqualTo => ordering == Ordering::Equal,
        CompOp::NotEqual => ordering != Ordering::Equal,
        CompOp::LessThan => ordering == Ordering::Less,
        CompOp::LessEqual => ordering != Ordering::Greater,
        CompOp::GreatThan => ordering == Ordering::Greater,
        CompOp::GreatEqual => ordering != Ordering::Less,
        CompOp::Like | CompOp::NotLike => false,
    }
}

impl fmt::Display for ComparisonExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left.name(true), self.comp, self.right.name(true))
    }
}

/// How a conjunction combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConjunctionType {
    /// All children true. Empty is true.
    And,
    /// Any child true. Empty is false.
    Or,
}

/// An ordered list of boolean children.
#[derive(Debug, Clone)]
pub struct ConjunctionExpr {
    conjunction_type: ConjunctionType,
    children: Vec<Expression>,
}

impl ConjunctionExpr {
    /// Creates a conjunction.
    pub fn new(conjunction_type: ConjunctionType, children: Vec<Expression>) -> Self {
        Self {
            conjunction_type,
            children,
        }
    }

    /// AND or OR.
    pub fn conjunction_type(&self) -> ConjunctionType {
        self.conjunction_type
    }

    /// Children in order.
    pub fn children(&self) -> &[Expression] {
        &self.children
    }

    pub(super) fn evaluate(&self, tuple: &Tuple) -> KestrelResult<Value> {
        let short_circuit_on = self.conjunction_type == ConjunctionType::Or;
        for child in &self.children {
            if child.get_value(tuple)?.get_boolean() == short_circuit_on {
                return Ok(Value::Boolean(short_circuit_on));
            }
        }
        Ok(Value::Boolean(!short_circuit_on))
    }
}

impl fmt::Display for ConjunctionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = match self.conjunction_type {
            ConjunctionType::And => " AND ",
            ConjunctionType::Or => " OR ",
        };
        let parts: Vec<String> = self.children.iter().map(|c| c.name(true)).collect();
        f.write_str(&parts.join(separator))
    }
}
