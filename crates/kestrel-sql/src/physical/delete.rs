//! Delete.

use std::sync::Arc;

use tracing::debug;

use kestrel_common::{KestrelError, KestrelResult};

use super::{
    child_tuple, close_children, open_children, Next, OperatorState, PhysicalOperator,
    PhysicalOperatorType,
};
use crate::executor::tuple::Tuple;
use crate::storage::{Table, Trx};

const KIND: PhysicalOperatorType = PhysicalOperatorType::Delete;

/// Deletes every row its child produces.
#[derive(Debug)]
pub struct DeletePhysicalOperator {
    table: Arc<Table>,
    children: Vec<Box<dyn PhysicalOperator>>,
    trx: Option<Arc<Trx>>,
    affected: usize,
    state: OperatorState,
}

impl DeletePhysicalOperator {
    /// Deletes from `table` the rows produced by `child`.
    pub fn new(table: Arc<Table>, child: Option<Box<dyn PhysicalOperator>>) -> Self {
        Self {
            table,
            children: child.into_iter().collect(),
            trx: None,
            affected: 0,
            state: OperatorState::default(),
        }
    }
}

impl PhysicalOperator for DeletePhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn param(&self) -> String {
        self.table.name().to_string()
    }

    fn open(&mut self, trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        self.trx = Some(Arc::clone(trx));
        self.affected = 0;
        open_children(KIND, &mut self.children, trx)
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        let (Some(child), Some(trx)) = (self.children.first_mut(), self.trx.as_ref()) else {
            return Ok(self.state.after_next(Next::EndOfStream));
        };
        while child.next()? == Next::Tuple {
            let tuple = child_tuple(KIND, child.as_ref())?;
            let row = tuple.as_row().ok_or_else(|| {
                KestrelError::internal(format!("{KIND} needs stored rows from its child"))
            })?;
            trx.delete_record(&self.table, row.record())?;
            self.affected += 1;
        }
        debug!(table = self.table.name(), rows = self.affected, "delete finished");
        Ok(self.state.after_next(Next::EndOfStream))
    }

    fn close(&mut self) -> KestrelResult<()> {
        self.state.on_close(KIND)?;
        self.trx = None;
        close_children(KIND, &mut self.children)
    }

    fn current_tuple(&self) -> Option<&Tuple> {
        None
    }

    fn children(&self) -> &[Box<dyn PhysicalOperator>] {
        &self.children
    }

    fn affected_rows(&self) -> usize {
        self.affected
    }
}
