//! In-place update.
//!
//! The replacement value is written straight into each row buffer. The
//! row lock is taken per tuple and held only for the byte copy; it does not
//! protect the scan that produced the row. Indexes are not maintained.

use std::sync::Arc;

use tracing::{debug, trace};

use kestrel_common::{KestrelError, KestrelResult};

use super::{
    child_tuple, close_children, open_children, Next, OperatorState, PhysicalOperator,
    PhysicalOperatorType,
};
use crate::executor::tuple::{RowTuple, Tuple};
use crate::storage::{FieldMeta, Table, Trx};
use crate::value::Value;

const KIND: PhysicalOperatorType = PhysicalOperatorType::Update;

/// Overwrites one column of every row its child produces.
#[derive(Debug)]
pub struct UpdatePhysicalOperator {
    table: Arc<Table>,
    field_name: String,
    value: Value,
    children: Vec<Box<dyn PhysicalOperator>>,
    trx: Option<Arc<Trx>>,
    affected: usize,
    state: OperatorState,
}

impl UpdatePhysicalOperator {
    /// Sets `field_name` to `value` on the rows produced by `child`. Without
    /// a child the operator does nothing.
    pub fn new(
        table: Arc<Table>,
        field_name: impl Into<String>,
        value: Value,
        child: Option<Box<dyn PhysicalOperator>>,
    ) -> Self {
        Self {
            table,
            field_name: field_name.into(),
            value,
            children: child.into_iter().collect(),
            trx: None,
            affected: 0,
            state: OperatorState::default(),
        }
    }

    /// Target column.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Replacement value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    fn target_field(&self) -> KestrelResult<&FieldMeta> {
        self.table
            .table_meta()
            .field_by_name(&self.field_name)
            .filter(|field| field.visible())
            .ok_or_else(|| KestrelError::field_not_found(self.table.name(), &self.field_name))
    }
}

/// Replacement bytes sized to the column.
fn column_bytes(value: &Value, field: &FieldMeta) -> Vec<u8> {
    let mut bytes = value.data();
    bytes.resize(field.len(), 0);
    bytes
}

fn write_row(row: &RowTuple, field: &FieldMeta, bytes: &[u8]) -> KestrelResult<()> {
    let record = row.record();
    record.write_field(field.offset(), bytes)?;
    trace!(rid = %record.rid(), field = field.name(), "updated record");
    Ok(())
}

impl PhysicalOperator for UpdatePhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn param(&self) -> String {
        format!("{}.{} = {}", self.table.name(), self.field_name, self.value)
    }

    fn open(&mut self, trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        self.trx = Some(Arc::clone(trx));
        self.affected = 0;
        open_children(KIND, &mut self.children, trx)
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        if self.children.is_empty() {
            return Ok(self.state.after_next(Next::EndOfStream));
        }

        let field = self.target_field()?.clone();
        let bytes = column_bytes(&self.value, &field);
        let child = &mut self.children[0];
        while child.next()? == Next::Tuple {
            let tuple = child_tuple(KIND, child.as_ref())?;
            let row = tuple.as_row().ok_or_else(|| {
                KestrelError::internal(format!("{KIND} needs stored rows from its child"))
            })?;
            write_row(row, &field, &bytes)?;
            self.affected += 1;
        }
        debug!(
            trx = ?self.trx.as_ref().map(|trx| trx.id()),
            table = self.table.name(),
            field = %self.field_name,
            rows = self.affected,
            "update finished"
        );
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
