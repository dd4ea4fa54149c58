//! Table scan.

use std::sync::Arc;

use kestrel_common::KestrelResult;

use super::{Next, OperatorState, PhysicalOperator, PhysicalOperatorType};
use crate::executor::tuple::{RowTuple, Tuple};
use crate::expr::Expression;
use crate::storage::{Record, Table, Trx};

const KIND: PhysicalOperatorType = PhysicalOperatorType::TableScan;

/// Reads every record of a table, keeping rows that satisfy all pushed-down
/// predicates.
///
/// The set of records is fixed at `open`; tuples are live handles, so
/// writes through them are visible in the table.
#[derive(Debug)]
pub struct TableScanPhysicalOperator {
    table: Arc<Table>,
    readonly: bool,
    predicates: Vec<Expression>,
    records: Vec<Record>,
    position: usize,
    current: Option<Tuple>,
    state: OperatorState,
}

impl TableScanPhysicalOperator {
    /// Creates a scan.
    pub fn new(table: Arc<Table>, readonly: bool, predicates: Vec<Expression>) -> Self {
        Self {
            table,
            readonly,
            predicates,
            records: Vec::new(),
            position: 0,
            current: None,
            state: OperatorState::default(),
        }
    }

    /// Returns false when the scan feeds an in-place modification.
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    /// Pushed-down predicates.
    pub fn predicates(&self) -> &[Expression] {
        &self.predicates
    }

    fn accepts(&self, tuple: &Tuple) -> KestrelResult<bool> {
        for predicate in &self.predicates {
            if !predicate.get_value(tuple)?.get_boolean() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl PhysicalOperator for TableScanPhysicalOperator {
    fn kind(&self) -> PhysicalOperatorType {
        KIND
    }

    fn param(&self) -> String {
        self.table.name().to_string()
    }

    fn open(&mut self, _trx: &Arc<Trx>) -> KestrelResult<()> {
        self.state.on_open(KIND)?;
        self.records = self.table.scan_records();
        self.position = 0;
        self.current = None;
        Ok(())
    }

    fn next(&mut self) -> KestrelResult<Next> {
        self.state.check_next(KIND)?;
        self.current = None;
        while let Some(record) = self.records.get(self.position) {
            self.position += 1;
            let tuple = Tuple::Row(RowTuple::new(Arc::clone(&self.table), record.clone()));
            if self.accepts(&tuple)? {
                self.current = Some(tuple);
                return Ok(self.state.after_next(Next::Tuple));
            }
        }
        Ok(self.state.after_next(Next::EndOfStream))
    }

    fn close(&mut self) -> KestrelResult<()> {
        self.state.on_close(KIND)?;
        self.records.clear();
        self.current = None;
        Ok(())
    }

    fn current_tuple(&self) -> Option<&Tuple> {
        self.current.as_ref()
    }

    fn children(&self) -> &[Box<dyn PhysicalOperator>] {
        &[]
    }
}
