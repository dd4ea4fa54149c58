//! Aggregation without grouping.
//!
//! The operator drains one child slot per output row. With a single child
//! it yields exactly one row, even for empty input. Plain column references
//! next to aggregates are only accepted when the tree supplies one child
//! per implicit group; they take their value from the last tuple of that
//! child, which is only meaningful when every tuple of the slot agrees.

use std::sync::Arc;

use tracing::{debug, warn};

use kestrel_common::{KestrelError, KestrelResult};

use super::{
    child_tuple, close_children, open_children, Next, OperatorState, PhysicalOperator,
    PhysicalOperatorType,
};
use crate::executor::accumulator::Accumulator;
use crate::executor::tuple::{Tuple, ValueListTuple};
use crate::expr::Expression;
use crate::storage::Trx;
use crate::value::Value;

const KIND: PhysicalOperatorType = PhysicalOperatorType::Aggregation;

/// Computes aggregates over its children, one output row per child.
#[derive(Debug)]
pub struct AggregationPhysicalOperator {
    expressions: Vec<Expression>,
    accumulators: Vec<Option<Accumulator>>,
    children: Vec<Box<dyn PhysicalOperator>>,
    child_index: usize,
    current: Option<Tuple>,
    state: OperatorState,
}

impl AggregationPhysicalOperator {
    /// Creates the operator. `expressions` is the select list; aggregates get
    /// an accumulator each, column references none.
    pub fn new(expressions: Vec<Expression>, children: Vec<Box<dyn PhysicalOperator>>) -> Self {
        let accumulators = expressions
            .iter()
            .map(|expr| match expr {
                Expression::Aggregation(aggr) => Some(aggr.create_accumulator()),
                _ => None,
            })
            .collect();
        Self {
            expressions,
            accumulators,
            children,
            child_index: 0,
            current: None,
            state: OperatorState::default(),
        }
    }

    /// The select list.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    fn has_group_columns(&self) -> bool {
        self.expressions
            .iter()
            .any(|expr| matches!(expr, Expression::Field(_)))
    }

    /// Drains the current child slot into the accumulators and returns the
    /// last tuple it produced.
    fn drain_child(&mut self) -> KestrelResult<Option<Tuple>> {
        for accumulator in self.accumulators.iter_mut().flatten() {
            accumulator.reset();
        }

        let keep_last = self.has_group_columns();
        let child = &mut self.children[self.child_index];
        let mut last = None;
        let mut rows = 0usize;
        loop {
            match child.next().map_err(drain_failure)? {
                Next::EndOfStream => break,
                Next::Tuple => {}
            }
            let tuple = child_tuple(KIND, child.as_ref())?;
            for (expr, accumulator) in self.expressions.iter().zip(self.accumulators.iter_mut()) {
                if let (Expression::Aggregation(aggr), Some(accumulator)) = (expr, accumulator) {
                    let value = aggr.input_value(tuple).map_err(drain_failure)?;
                    accumulator.accumulate(&value)?;
                }
            }
            if keep_last {
                last = Some(tuple.clone());
            }
            rows += 1;
        }
        debug!(slot = self.child_index, rows, "aggregation drained child");
        Ok(last)
    }

    fn build_row(&self, last: Option<&Tuple>) -> KestrelResult<Tuple> {
        let mut specs = Vec::with_capacity(self.expressions.len());
        let mut cells = Vec::with_capacity(self.expressions.len());
        for (expr, accumulator) in self.expressions.iter().zip(&self.accumulators) {
            match (expr, accumulator) {
                (Expression::Aggregation(aggr), Some(accumulator)) => {
                    specs.push(aggr.cell_spec());
                    cells.push(accumulator.finalize());
                }
                (Expression::Field(field), _) => {
                    let value = match last {
                        Some(tuple) => tuple
                            .find_cell(&field.cell_spec())
                            .map_err(drain_failure)?
                            .unwrap_or(Value::Null),
                        None => Value::Null,
                    };
                    specs.push(field.cell_spec());
                    cells.push(value);
                }
                (other, _) => {
                    return Err(KestrelError::internal(format!(
                        "unexpected {:?} expression '{}' in aggregation",
                        other.expr_type(),
                        other.name(true)
                    )));
                }
            }
        }
        Ok(Tuple::ValueList(ValueListTuple::new(specs, cells)?))
    }
}

fn drain_failure(e: KestrelError) -> KestrelError {
    warn!(error = %e, "aggregation failed to read child tuple");
    KestrelError::internal(format!("aggregation input failed: {e}"))
}

impl PhysicalOperator for AggregationPhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn param(&self) -> String {
        self.expressions
            .iter()
            .map(|expr| expr.name(true))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn open(&mut self, trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        if self.children.is_empty() {
            return Err(KestrelError::internal(format!("{KIND} has no child operator")));
        }
        self.child_index = 0;
        self.current = None;
        open_children(KIND, &mut self.children, trx)
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        self.current = None;
        if self.child_index >= self.children.len() {
            return Ok(self.state.after_next(Next::EndOfStream));
        }
        if self.has_group_columns() && self.children.len() <= 1 {
            return Err(KestrelError::internal(
                "column references next to aggregates need one child per group",
            ));
        }

        let last = self.drain_child()?;
        let row = self.build_row(last.as_ref())?;
        self.child_index += 1;
        self.current = Some(row);
        Ok(self.state.after_next(Next::Tuple))
    }

    fn close(&mut self) -> KestrelResult<()> {
        self.state.on_close(KIND)?;
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
