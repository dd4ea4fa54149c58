//! Filter.

use std::sync::Arc;

use kestrel_common::KestrelResult;

use super::{
    child_tuple, close_children, expect_children, open_children, Next, OperatorState,
    PhysicalOperator, PhysicalOperatorType,
};
use crate::executor::tuple::Tuple;
use crate::expr::Expression;
use crate::storage::Trx;

const KIND: PhysicalOperatorType = PhysicalOperatorType::Predicate;

/// Passes through child tuples for which the expression is true.
#[derive(Debug)]
pub struct PredicatePhysicalOperator {
    expression: Expression,
    children: Vec<Box<dyn PhysicalOperator>>,
    state: OperatorState,
}

impl PredicatePhysicalOperator {
    /// Creates a filter over `child`.
    pub fn new(expression: Expression, child: Box<dyn PhysicalOperator>) -> Self {
        Self {
            expression,
            children: vec![child],
            state: OperatorState::default(),
        }
    }

    /// The filter expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

impl PhysicalOperator for PredicatePhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn param(&self) -> String {
        self.expression.name(true)
    }

    fn open(&mut self, trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        expect_children(KIND, &self.children, 1)?;
        open_children(KIND, &mut self.children, trx)
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        let child = &mut self.children[0];
        while child.next()? == Next::Tuple {
            let tuple = child_tuple(KIND, child.as_ref())?;
            if self.expression.get_value(tuple)?.get_boolean() {
                return Ok(self.state.after_next(Next::Tuple));
            }
        }
        Ok(self.state.after_next(Next::EndOfStream))
    }

    fn close(&mut self) -> KestrelResult<()> {
        self.state.on_close(KIND)?;
        close_children(KIND, &mut self.children)
    }

    fn current_tuple(&self) -> Option<&Tuple> {
        if !self.state.is_producing() {
            return None;
        }
        self.children.first().and_then(|child| child.current_tuple())
    }

    fn children(&self) -> &[Box<dyn PhysicalOperator>] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CompOp;
    use crate::physical::testing::{mock_compare, mock_table, MockOperator};
    use crate::storage::TrxManager;
    use crate::value::Value;
    use kestrel_common::ErrorCode;

    #[test]
    fn test_filters_rows() {
        let child = MockOperator::with_values(vec![
            vec![Value::Int(1)],
            vec![Value::Int(5)],
            vec![Value::Int(2)],
        ]);
        let expression = mock_compare(&mock_table(), "c0", CompOp::GreatEqual, 2);
        let mut op = PredicatePhysicalOperator::new(expression, Box::new(child));
        op.open(&TrxManager::new().begin()).unwrap();

        let mut seen = Vec::new();
        while op.next().unwrap() == Next::Tuple {
            seen.push(op.current_tuple().unwrap().cell_at(0).unwrap());
        }
        assert_eq!(seen, vec![Value::Int(5), Value::Int(2)]);
        assert!(op.current_tuple().is_none());
        op.close().unwrap();
    }

    #[test]
    fn test_child_errors_propagate_unchanged() {
        let mut child = MockOperator::with_values(vec![vec![Value::Int(1)]]);
        child.fail_next_at = Some(0);
        let expression = Expression::Value(Value::Boolean(true));
        let mut op = PredicatePhysicalOperator::new(expression, Box::new(child));
        op.open(&TrxManager::new().begin()).unwrap();
        assert_eq!(op.next().unwrap_err().code(), ErrorCode::InvalidValue);
    }
}
