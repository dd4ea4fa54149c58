//! Projection.

use std::sync::Arc;

use kestrel_common::KestrelResult;

use super::{
    child_tuple, close_children, expect_children, open_children, Next, OperatorState,
    PhysicalOperator, PhysicalOperatorType,
};
use crate::executor::tuple::{Tuple, TupleCellSpec, ValueListTuple};
use crate::expr::Expression;
use crate::storage::Trx;

const KIND: PhysicalOperatorType = PhysicalOperatorType::Project;

/// Evaluates the select list against each child tuple.
#[derive(Debug)]
pub struct ProjectPhysicalOperator {
    expressions: Vec<Expression>,
    specs: Vec<TupleCellSpec>,
    children: Vec<Box<dyn PhysicalOperator>>,
    current: Option<Tuple>,
    state: OperatorState,
}

impl ProjectPhysicalOperator {
    /// Projects `expressions` out of `child`. Column cells are named
    /// `table.field` when `multi_table` is set.
    pub fn new(
        expressions: Vec<Expression>,
        multi_table: bool,
        child: Box<dyn PhysicalOperator>,
    ) -> Self {
        let specs = expressions
            .iter()
            .map(|expr| expr.cell_spec(multi_table))
            .collect();
        Self {
            expressions,
            specs,
            children: vec![child],
            current: None,
            state: OperatorState::default(),
        }
    }

    /// The select list.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Specs of the produced cells.
    pub fn specs(&self) -> &[TupleCellSpec] {
        &self.specs
    }
}

impl PhysicalOperator for ProjectPhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn param(&self) -> String {
        self.specs
            .iter()
            .map(|spec| spec.alias())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn open(&mut self, trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        expect_children(KIND, &self.children, 1)?;
        open_children(KIND, &mut self.children, trx)
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        self.current = None;
        let child = &mut self.children[0];
        if child.next()? == Next::EndOfStream {
            return Ok(self.state.after_next(Next::EndOfStream));
        }
        let tuple = child_tuple(KIND, child.as_ref())?;
        let cells = self
            .expressions
            .iter()
            .map(|expr| expr.get_value(tuple))
            .collect::<KestrelResult<Vec<_>>>()?;
        self.current = Some(Tuple::ValueList(ValueListTuple::new(self.specs.clone(), cells)?));
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
