//! Tuples flowing between physical operators.
//!
//! A tuple is one of:
//!
//! - [`RowTuple`]: a live handle on a stored record; cells are decoded from
//!   the record bytes on access
//! - [`ValueListTuple`]: materialized values with matching cell specs, used
//!   for projections and aggregated rows
//! - [`JoinedTuple`]: a left and right tuple read as one row

use std::fmt;
use std::sync::Arc;

use kestrel_common::{KestrelError, KestrelResult};

use crate::storage::{FieldMeta, Record, Table};
use crate::value::Value;

/// Identifies a cell: by table and field for column cells, by alias for
/// computed cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TupleCellSpec {
    table_name: String,
    field_name: String,
    alias: String,
}

impl TupleCellSpec {
    /// Spec for a column; the alias is the field name.
    pub fn new(table_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            table_name: table_name.into(),
            alias: field_name.clone(),
            field_name,
        }
    }

    /// Spec for a column with a display alias.
    pub fn with_alias(
        table_name: impl Into<String>,
        field_name: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            field_name: field_name.into(),
            alias: alias.into(),
        }
    }

    /// Spec for a computed cell known only by its alias.
    pub fn from_alias(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            ..Self::default()
        }
    }

    /// Table name, empty for computed cells.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Field name, empty for computed cells.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Display name.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Column specs match on table and field; computed specs on alias.
    pub fn matches(&self, other: &TupleCellSpec) -> bool {
        if self.field_name.is_empty() || other.field_name.is_empty() {
            self.alias == other.alias
        } else {
            self.table_name == other.table_name && self.field_name == other.field_name
        }
    }
}

impl fmt::Display for TupleCellSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alias)
    }
}

/// A live view of a stored record.
#[derive(Debug, Clone)]
pub struct RowTuple {
    table: Arc<Table>,
    record: Record,
}

impl RowTuple {
    /// Wraps a record of `table`.
    pub fn new(table: Arc<Table>, record: Record) -> Self {
        Self { table, record }
    }

    /// The owning table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// The record handle.
    pub fn record(&self) -> &Record {
        &self.record
    }

    fn read(&self, field: &FieldMeta) -> KestrelResult<Value> {
        let bytes = self.record.read_field(field.offset(), field.len())?;
        Value::from_data(field.attr_type(), &bytes)
    }

    fn cell_num(&self) -> usize {
        self.table.table_meta().user_fields().len()
    }

    fn user_field(&self, index: usize) -> KestrelResult<&FieldMeta> {
        self.table
            .table_meta()
            .user_fields()
            .get(index)
            .ok_or_else(|| cell_out_of_range(index, self.cell_num()))
    }

    fn find_cell(&self, spec: &TupleCellSpec) -> KestrelResult<Option<Value>> {
        if spec.table_name() != self.table.name() {
            return Ok(None);
        }
        match self.table.table_meta().field_by_name(spec.field_name()) {
            Some(field) => self.read(field).map(Some),
            None => Ok(None),
        }
    }
}

/// Materialized values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueListTuple {
    specs: Vec<TupleCellSpec>,
    cells: Vec<Value>,
}

impl ValueListTuple {
    /// Pairs specs with values. Both lists must have the same length.
    pub fn new(specs: Vec<TupleCellSpec>, cells: Vec<Value>) -> KestrelResult<Self> {
        if specs.len() != cells.len() {
            return Err(KestrelError::internal(format!(
                "{} cell specs for {} values",
                specs.len(),
                cells.len()
            )));
        }
        Ok(Self { specs, cells })
    }

    /// The values.
    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    /// The specs.
    pub fn specs(&self) -> &[TupleCellSpec] {
        &self.specs
    }
}

/// Two tuples read as one row, left cells first.
#[derive(Debug, Clone)]
pub struct JoinedTuple {
    left: Box<Tuple>,
    right: Box<Tuple>,
}

impl JoinedTuple {
    /// Joins two tuples.
    pub fn new(left: Tuple, right: Tuple) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Left side.
    pub fn left(&self) -> &Tuple {
        &self.left
    }

    /// Right side.
    pub fn right(&self) -> &Tuple {
        &self.right
    }
}

/// A row produced by a physical operator.
#[derive(Debug, Clone)]
pub enum Tuple {
    /// Stored record.
    Row(RowTuple),
    /// Materialized values.
    ValueList(ValueListTuple),
    /// Left and right rows.
    Joined(JoinedTuple),
}

impl Tuple {
    /// Number of cells.
    pub fn cell_num(&self) -> usize {
        match self {
            Tuple::Row(row) => row.cell_num(),
            Tuple::ValueList(list) => list.cells.len(),
            Tuple::Joined(joined) => joined.left.cell_num() + joined.right.cell_num(),
        }
    }

    /// Cell by position.
    pub fn cell_at(&self, index: usize) -> KestrelResult<Value> {
        match self {
            Tuple::Row(row) => row.read(row.user_field(index)?),
            Tuple::ValueList(list) => list
                .cells
                .get(index)
                .cloned()
                .ok_or_else(|| cell_out_of_range(index, list.cells.len())),
            Tuple::Joined(joined) => {
                let left_num = joined.left.cell_num();
                if index < left_num {
                    joined.left.cell_at(index)
                } else {
                    joined.right.cell_at(index - left_num)
                }
            }
        }
    }

    /// Spec of the cell at `index`.
    pub fn spec_at(&self, index: usize) -> KestrelResult<TupleCellSpec> {
        match self {
            Tuple::Row(row) => {
                let field = row.user_field(index)?;
                Ok(TupleCellSpec::new(row.table.name(), field.name()))
            }
            Tuple::ValueList(list) => list
                .specs
                .get(index)
                .cloned()
                .ok_or_else(|| cell_out_of_range(index, list.specs.len())),
            Tuple::Joined(joined) => {
                let left_num = joined.left.cell_num();
                if index < left_num {
                    joined.left.spec_at(index)
                } else {
                    joined.right.spec_at(index - left_num)
                }
            }
        }
    }

    /// Looks a cell up by spec. `Ok(None)` when no cell matches.
    pub fn find_cell(&self, spec: &TupleCellSpec) -> KestrelResult<Option<Value>> {
        match self {
            Tuple::Row(row) => row.find_cell(spec),
            Tuple::ValueList(list) => Ok(list
                .specs
                .iter()
                .position(|candidate| candidate.matches(spec))
                .map(|index| list.cells[index].clone())),
            Tuple::Joined(joined) => match joined.left.find_cell(spec)? {
                Some(value) => Ok(Some(value)),
                None => joined.right.find_cell(spec),
            },
        }
    }

    /// The stored-record view, if this is one.
    pub fn as_row(&self) -> Option<&RowTuple> {
        match self {
            Tuple::Row(row) => Some(row),
            _ => None,
        }
    }

    /// All cells in order.
    pub fn values(&self) -> KestrelResult<Vec<Value>> {
        (0..self.cell_num()).map(|i| self.cell_at(i)).collect()
    }
}

fn cell_out_of_range(index: usize, len: usize) -> KestrelError {
    KestrelError::internal(format!("cell {index} out of range for tuple of {len} cells"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AttrInfo;
    use crate::storage::TableMeta;
    use crate::value::AttrType;
    use kestrel_common::TxnId;

    fn row(name: &str, a: i32, s: &str) -> Tuple {
        let meta = TableMeta::new(
            1,
            name,
            &[AttrInfo::new("a", AttrType::Ints), AttrInfo::chars("s", 4)],
        )
        .unwrap();
        let table = Arc::new(Table::new(meta));
        table
            .insert_record(TxnId::MIN, &[Value::Int(a), Value::from(s)])
            .unwrap();
        let record = table.scan_records().remove(0);
        Tuple::Row(RowTuple::new(table, record))
    }

    #[test]
    fn test_row_tuple() {
        let tuple = row("t", 4, "xy");
        assert_eq!(tuple.cell_num(), 2);
        assert_eq!(tuple.cell_at(0).unwrap(), Value::Int(4));
        assert_eq!(tuple.spec_at(1).unwrap(), TupleCellSpec::new("t", "s"));
        assert_eq!(
            tuple.find_cell(&TupleCellSpec::new("t", "s")).unwrap(),
            Some(Value::from("xy"))
        );
        assert_eq!(tuple.find_cell(&TupleCellSpec::new("u", "s")).unwrap(), None);
        assert!(tuple.cell_at(2).is_err());
    }

    #[test]
    fn test_joined_tuple() {
        let joined = Tuple::Joined(JoinedTuple::new(row("l", 1, "a"), row("r", 2, "b")));
        assert_eq!(joined.cell_num(), 4);
        assert_eq!(joined.cell_at(2).unwrap(), Value::Int(2));
        assert_eq!(joined.spec_at(3).unwrap(), TupleCellSpec::new("r", "s"));
        assert_eq!(
            joined.find_cell(&TupleCellSpec::new("r", "a")).unwrap(),
            Some(Value::Int(2))
        );
        assert_eq!(
            joined.values().unwrap(),
            vec![Value::Int(1), Value::from("a"), Value::Int(2), Value::from("b")]
        );
    }

    #[test]
    fn test_value_list_lookup() {
        let tuple = Tuple::ValueList(
            ValueListTuple::new(
                vec![
                    TupleCellSpec::from_alias("COUNT(*)"),
                    TupleCellSpec::with_alias("t", "a", "t.a"),
                ],
                vec![Value::Int(3), Value::Int(9)],
            )
            .unwrap(),
        );
        assert_eq!(
            tuple.find_cell(&TupleCellSpec::from_alias("COUNT(*)")).unwrap(),
            Some(Value::Int(3))
        );
        assert_eq!(
            tuple.find_cell(&TupleCellSpec::new("t", "a")).unwrap(),
            Some(Value::Int(9))
        );
        assert!(ValueListTuple::new(vec![], vec![Value::Null]).is_err());
    }
}
