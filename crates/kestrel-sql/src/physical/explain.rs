//! EXPLAIN.

use std::fmt::Write as _;
use std::sync::Arc;

use kestrel_common::constants::EXPLAIN_COLUMN;
use kestrel_common::KestrelResult;

use super::{expect_children, Next, OperatorState, PhysicalOperator, PhysicalOperatorType};
use crate::executor::tuple::{Tuple, TupleCellSpec, ValueListTuple};
use crate::storage::Trx;
use crate::value::Value;

const KIND: PhysicalOperatorType = PhysicalOperatorType::Explain;

/// Renders a physical tree, one operator per line, children indented by two
/// spaces under their parent.
///
/// ```text
/// PROJECT(SUM(b))
///   AGGREGATION(SUM(b))
///     TABLE_SCAN(t)
/// ```
pub fn render_plan(root: &dyn PhysicalOperator) -> String {
    let mut out = String::new();
    render_node(root, 0, &mut out);
    out
}

fn render_node(op: &dyn PhysicalOperator, depth: usize, out: &mut String) {
    if depth > 0 {
        out.push('\n');
    }
    out.push_str(&"  ".repeat(depth));
    out.push_str(op.name());
    let param = op.param();
    if !param.is_empty() {
        let _ = write!(out, "({param})");
    }
    for child in op.children() {
        render_node(child.as_ref(), depth + 1, out);
    }
}

/// Yields the rendered child plan as a single text cell. The child is never
/// opened.
#[derive(Debug)]
pub struct ExplainPhysicalOperator {
    children: Vec<Box<dyn PhysicalOperator>>,
    current: Option<Tuple>,
    done: bool,
    state: OperatorState,
}

impl ExplainPhysicalOperator {
    /// Explains `child`.
    pub fn new(child: Box<dyn PhysicalOperator>) -> Self {
        Self {
            children: vec![child],
            current: None,
            done: false,
            state: OperatorState::default(),
        }
    }
}

impl PhysicalOperator for ExplainPhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn open(&mut self, _trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        expect_children(KIND, &self.children, 1)?;
        self.done = false;
        Ok(())
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        self.current = None;
        if self.done {
            return Ok(self.state.after_next(Next::EndOfStream));
        }
        let text = render_plan(self.children[0].as_ref());
        self.current = Some(Tuple::ValueList(ValueListTuple::new(
            vec![TupleCellSpec::from_alias(EXPLAIN_COLUMN)],
            vec![Value::Chars(text)],
        )?));
        self.done = true;
        Ok(self.state.after_next(Next::Tuple))
    }

    fn close(&mut self) -> KestrelResult<()> {
        self.state.on_close(KIND)?;
        self.current = None;
        Ok(())
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
    use crate::expr::Expression;
    use crate::parser::CompOp;
    use crate::physical::testing::{mock_compare, mock_table, MockOperator};
    use crate::physical::{PredicatePhysicalOperator, ProjectPhysicalOperator};
    use crate::storage::TrxManager;

    #[test]
    fn test_render_nested_plan() {
        let table = mock_table();
        let filter = PredicatePhysicalOperator::new(
            mock_compare(&table, "c0", CompOp::GreatThan, 1),
            Box::new(MockOperator::default()),
        );
        let project = ProjectPhysicalOperator::new(
            vec![Expression::Value(Value::Int(1))],
            false,
            Box::new(filter),
        );
        assert_eq!(
            render_plan(&project),
            "PROJECT(1)\n  PREDICATE(m.c0 > 1)\n    PREDICATE"
        );
    }

    #[test]
    fn test_explain_yields_one_cell_without_running_child() {
        let child = MockOperator::with_values(vec![vec![Value::Int(1)]]);
        let closed = Arc::clone(&child.closed);
        let mut explain = ExplainPhysicalOperator::new(Box::new(child));
        explain.open(&TrxManager::new().begin()).unwrap();
        assert_eq!(explain.next().unwrap(), Next::Tuple);
        let tuple = explain.current_tuple().unwrap();
        assert_eq!(tuple.spec_at(0).unwrap().alias(), EXPLAIN_COLUMN);
        assert_eq!(tuple.cell_at(0).unwrap(), Value::from("PREDICATE"));
        assert_eq!(explain.next().unwrap(), Next::EndOfStream);
        explain.close().unwrap();
        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }
}
