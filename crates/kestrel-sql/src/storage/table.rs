//! Tables.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use kestrel_common::{KestrelError, KestrelResult, RecordId, TxnId};

use super::{IndexMeta, Record, TableMeta};
use crate::value::Value;

/// An in-memory table of fixed-size records.
#[derive(Debug)]
pub struct Table {
    meta: TableMeta,
    records: RwLock<BTreeMap<RecordId, Record>>,
    indexes: RwLock<Vec<IndexMeta>>,
    next_rid: AtomicU64,
}

impl Table {
    /// Creates an empty table.
    pub fn new(meta: TableMeta) -> Self {
        Self {
            meta,
            records: RwLock::new(BTreeMap::new()),
            indexes: RwLock::new(Vec::new()),
            next_rid: AtomicU64::new(1),
        }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    /// Schema.
    pub fn table_meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Encodes `values` (one per user field, already of the field types) and
    /// stores them stamped with `trx_id`.
    pub fn insert_record(&self, trx_id: TxnId, values: &[Value]) -> KestrelResult<RecordId> {
        let fields = self.meta.user_fields();
        if values.len() != fields.len() {
            return Err(KestrelError::FieldCountMismatch {
                table: self.name().to_string(),
                expected: fields.len(),
                actual: values.len(),
            });
        }

        let mut data = vec![0u8; self.meta.record_size()];
        if let Some(trx_field) = self.meta.trx_field() {
            let offset = trx_field.offset();
            data[offset..offset + trx_field.len()].copy_from_slice(&trx_id.to_le_bytes());
        }

        for (field, value) in fields.iter().zip(values) {
            if value.attr_type() != field.attr_type() {
                return Err(KestrelError::FieldTypeMismatch {
                    table: self.name().to_string(),
                    field: field.name().to_string(),
                    expected: field.attr_type().to_string(),
                    actual: value.attr_type().to_string(),
                });
            }
            let bytes = value.data();
            if bytes.len() > field.len() {
                return Err(KestrelError::invalid_value(format!(
                    "value for '{}.{}' is {} bytes, column holds {}",
                    self.name(),
                    field.name(),
                    bytes.len(),
                    field.len()
                )));
            }
            data[field.offset()..field.offset() + bytes.len()].copy_from_slice(&bytes);
        }

        let rid = RecordId::new(self.next_rid.fetch_add(1, Ordering::Relaxed));
        self.records.write().insert(rid, Record::new(rid, data));
        debug!(table = self.name(), %rid, %trx_id, "inserted record");
        Ok(rid)
    }

    /// Removes a record.
    pub fn delete_record(&self, rid: RecordId) -> KestrelResult<()> {
        match self.records.write().remove(&rid) {
            Some(_) => Ok(()),
            None => Err(KestrelError::internal(format!(
                "record {rid} not found in table '{}'",
                self.name()
            ))),
        }
    }

    /// Snapshot of the record handles in id order.
    pub fn scan_records(&self) -> Vec<Record> {
        self.records.read().values().cloned().collect()
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    /// Registers index metadata. Only the metadata is kept; scans never use
    /// indexes.
    pub fn create_index(&self, name: &str, field_names: &[String]) -> KestrelResult<IndexMeta> {
        let index = IndexMeta::new(&self.meta, name, field_names)?;
        let mut indexes = self.indexes.write();
        if indexes.iter().any(|existing| existing.name() == name) {
            return Err(KestrelError::invalid_argument(format!(
                "index '{name}' already exists on '{}'",
                self.name()
            )));
        }
        indexes.push(index.clone());
        debug!(table = self.name(), index = %index, "created index");
        Ok(index)
    }

    /// Index metadata registered on this table.
    pub fn indexes(&self) -> Vec<IndexMeta> {
        self.indexes.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AttrInfo;
    use crate::value::AttrType;
    use kestrel_common::ErrorCode;

    fn table() -> Table {
        let meta = TableMeta::new(
            1,
            "t",
            &[AttrInfo::new("a", AttrType::Ints), AttrInfo::chars("s", 4)],
        )
        .unwrap();
        Table::new(meta)
    }

    #[test]
    fn test_insert_and_read_back() {
        let table = table();
        let rid = table
            .insert_record(TxnId::new(7), &[Value::Int(5), Value::from("ab")])
            .unwrap();
        let records = table.scan_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rid(), rid);

        let meta = table.table_meta();
        let trx = meta.trx_field().unwrap();
        assert_eq!(records[0].read_field(trx.offset(), 4).unwrap(), vec![7, 0, 0, 0]);
        let s = meta.field_by_name("s").unwrap();
        let bytes = records[0].read_field(s.offset(), s.len()).unwrap();
        assert_eq!(Value::from_data(AttrType::Chars, &bytes).unwrap(), Value::from("ab"));
    }

    #[test]
    fn test_insert_validation() {
        let table = table();
        let code = |values: &[Value]| table.insert_record(TxnId::MIN, values).unwrap_err().code();
        assert_eq!(code(&[Value::Int(1)]), ErrorCode::FieldCountMismatch);
        assert_eq!(code(&[Value::Float(1.0), Value::from("a")]), ErrorCode::FieldTypeMismatch);
        assert_eq!(code(&[Value::Int(1), Value::from("abcde")]), ErrorCode::InvalidValue);
        assert_eq!(table.record_count(), 0);
    }

    #[test]
    fn test_delete() {
        let table = table();
        let rid = table
            .insert_record(TxnId::MIN, &[Value::Int(1), Value::from("x")])
            .unwrap();
        table.delete_record(rid).unwrap();
        assert_eq!(table.record_count(), 0);
        assert!(table.delete_record(rid).is_err());
    }

    #[test]
    fn test_indexes() {
        let table = table();
        table.create_index("idx_a", &["a".to_string()]).unwrap();
        assert!(table.create_index("idx_a", &["s".to_string()]).is_err());
        assert!(table.create_index("idx_z", &["z".to_string()]).is_err());
        assert_eq!(table.indexes().len(), 1);
    }
}
