//! Nested-loop join.

use std::sync::Arc;

use kestrel_common::KestrelResult;

use super::{
    child_tuple, close_children, expect_children, open_children, Next, OperatorState,
    PhysicalOperator, PhysicalOperatorType,
};
use crate::executor::tuple::{JoinedTuple, Tuple};
use crate::storage::Trx;

const KIND: PhysicalOperatorType = PhysicalOperatorType::NestedLoopJoin;

/// Cross product of two children.
///
/// The right child is drained into memory on the first `next`; the left
/// child is then streamed, and each left tuple is paired with every
/// buffered right tuple.
#[derive(Debug)]
pub struct NestedLoopJoinPhysicalOperator {
    children: Vec<Box<dyn PhysicalOperator>>,
    right_tuples: Option<Vec<Tuple>>,
    right_position: usize,
    left_tuple: Option<Tuple>,
    current: Option<Tuple>,
    state: OperatorState,
}

impl NestedLoopJoinPhysicalOperator {
    /// Joins `left` with `right`.
    pub fn new(left: Box<dyn PhysicalOperator>, right: Box<dyn PhysicalOperator>) -> Self {
        Self {
            children: vec![left, right],
            right_tuples: None,
            right_position: 0,
            left_tuple: None,
            current: None,
            state: OperatorState::default(),
        }
    }

    fn load_right(&mut self) -> KestrelResult<()> {
        let right = &mut self.children[1];
        let mut tuples = Vec::new();
        while right.next()? == Next::Tuple {
            tuples.push(child_tuple(KIND, right.as_ref())?.clone());
        }
        self.right_tuples = Some(tuples);
        Ok(())
    }
}

impl PhysicalOperator for NestedLoopJoinPhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn open(&mut self, trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        expect_children(KIND, &self.children, 2)?;
        self.right_tuples = None;
        self.right_position = 0;
        self.left_tuple = None;
        open_children(KIND, &mut self.children, trx)
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        self.current = None;
        if self.right_tuples.is_none() {
            self.load_right()?;
        }
        let right_tuples = self.right_tuples.as_deref().unwrap_or_default();
        if right_tuples.is_empty() {
            return Ok(self.state.after_next(Next::EndOfStream));
        }

        if self.left_tuple.is_none() || self.right_position >= right_tuples.len() {
            let left = &mut self.children[0];
            if left.next()? == Next::EndOfStream {
                self.left_tuple = None;
                return Ok(self.state.after_next(Next::EndOfStream));
            }
            self.left_tuple = Some(child_tuple(KIND, left.as_ref())?.clone());
            self.right_position = 0;
        }

        let (Some(left), Some(right)) = (
            self.left_tuple.clone(),
            right_tuples.get(self.right_position).cloned(),
        ) else {
            return Ok(self.state.after_next(Next::EndOfStream));
        };
        self.right_position += 1;
        self.current = Some(Tuple::Joined(JoinedTuple::new(left, right)));
        Ok(self.state.after_next(Next::Tuple))
    }

    fn close(&mut self) -> KestrelResult<()> {
        self.state.on_close(KIND)?;
        self.right_tuples = None;
        self.left_tuple = None;
        self.current = None;
        close_children(KIND, &mut self.children)
    }

    fn current_tuple(&self) -> Option<&Tuple> {
        self.current.as_ref()
    }

    fn children(&self) -> &[Box<dyn PhysicalOperator>] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::physical::testing::MockOperator;
    use crate::storage::TrxManager;
    use crate::value::Value;
    use kestrel_common::ErrorCode;

    fn ints(values: &[i32]) -> MockOperator {
        MockOperator::with_values(values.iter().map(|v| vec![Value::Int(*v)]).collect())
    }

    #[test]
    fn test_cross_product() {
        let mut join = NestedLoopJoinPhysicalOperator::new(Box::new(ints(&[1, 2])), Box::new(ints(&[10, 20, 30])));
        join.open(&TrxManager::new().begin()).unwrap();
        let mut rows = Vec::new();
        while join.next().unwrap() == Next::Tuple {
            rows.push(join.current_tuple().unwrap().values().unwrap());
        }
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], vec![Value::Int(1), Value::Int(10)]);
        assert_eq!(rows[5], vec![Value::Int(2), Value::Int(30)]);
        join.close().unwrap();
    }

    #[test]
    fn test_empty_right_side() {
        let mut join = NestedLoopJoinPhysicalOperator::new(Box::new(ints(&[1, 2])), Box::new(ints(&[])));
        join.open(&TrxManager::new().begin()).unwrap();
        assert_eq!(join.next().unwrap(), Next::EndOfStream);
        join.close().unwrap();
    }

    #[test]
    fn test_close_reaches_every_child() {
        let mut left = ints(&[1]);
        left.fail_close = true;
        let left_closed = Arc::clone(&left.closed);
        let right = ints(&[2]);
        let right_closed = Arc::clone(&right.closed);

        let mut join = NestedLoopJoinPhysicalOperator::new(Box::new(left), Box::new(right));
        join.open(&TrxManager::new().begin()).unwrap();
        let err = join.close().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
        assert_eq!(left_closed.load(Ordering::SeqCst), 1);
        assert_eq!(right_closed.load(Ordering::SeqCst), 1);
    }
}
