//! Insert.

use std::sync::Arc;

use tracing::debug;

use kestrel_common::KestrelResult;

use super::{Next, OperatorState, PhysicalOperator, PhysicalOperatorType};
use crate::executor::tuple::Tuple;
use crate::storage::{Table, Trx};
use crate::value::Value;

const KIND: PhysicalOperatorType = PhysicalOperatorType::Insert;

/// Inserts one row when opened; `next` only reports end-of-stream.
#[derive(Debug)]
pub struct InsertPhysicalOperator {
    table: Arc<Table>,
    values: Vec<Value>,
    affected: usize,
    state: OperatorState,
}

impl InsertPhysicalOperator {
    /// Inserts `values`, already coerced to the column types.
    pub fn new(table: Arc<Table>, values: Vec<Value>) -> Self {
        Self {
            table,
            values,
            affected: 0,
            state: OperatorState::default(),
        }
    }
}

impl PhysicalOperator for InsertPhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn param(&self) -> String {
        self.table.name().to_string()
    }

    fn open(&mut self, trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        let rid = trx.insert_record(&self.table, &self.values)?;
        debug!(table = self.table.name(), rid = %rid, "inserted record");
        self.affected = 1;
        Ok(())
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        Ok(self.state.after_next(Next::EndOfStream))
    }

    fn close(&mut self) -> KestrelResult<()> {
        self.state.on_close(KIND)
    }

    fn current_tuple(&self) -> Option<&Tuple> {
        None
    }

    fn children(&self) -> &[Box<dyn PhysicalOperator>] {
        &[]
    }

    fn affected_rows(&self) -> usize {
        self.affected
    }
}
