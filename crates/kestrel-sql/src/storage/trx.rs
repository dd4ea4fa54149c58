//! Transaction handles.
//!
//! A transaction here is an identity: it stamps inserted records and
//! performs deletes on behalf of a statement. Concurrency control between
//! transactions is not modelled.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::debug;

use kestrel_common::{KestrelResult, RecordId, TxnId};

use super::{Record, Table};
use crate::value::Value;

/// An open transaction.
#[derive(Debug)]
pub struct Trx {
    id: TxnId,
}

impl Trx {
    /// Transaction id.
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// Inserts a record stamped with this transaction.
    pub fn insert_record(&self, table: &Table, values: &[Value]) -> KestrelResult<RecordId> {
        table.insert_record(self.id, values)
    }

    /// Deletes a record.
    pub fn delete_record(&self, table: &Table, record: &Record) -> KestrelResult<()> {
        debug!(trx = %self.id, table = table.name(), rid = %record.rid(), "delete record");
        table.delete_record(record.rid())
    }
}

/// Hands out transactions with increasing ids.
#[derive(Debug)]
pub struct TrxManager {
    next_id: AtomicU32,
}

impl Default for TrxManager {
    fn default() -> Self {
        Self {
            next_id: AtomicU32::new(TxnId::MIN.as_u32()),
        }
    }
}

impl TrxManager {
    /// Creates a manager whose first transaction has id 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a transaction.
    pub fn begin(&self) -> Arc<Trx> {
        let id = TxnId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(trx = %id, "begin transaction");
        Arc::new(Trx { id })
    }
}
