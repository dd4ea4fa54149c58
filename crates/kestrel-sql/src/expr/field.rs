//! Bound column references.

use std::fmt;
use std::sync::Arc;

use crate::executor::tuple::TupleCellSpec;
use crate::storage::{FieldMeta, Table};
use crate::value::AttrType;

/// A column of a specific table, resolved during binding.
#[derive(Clone)]
pub struct Field {
    table: Arc<Table>,
    meta: FieldMeta,
}

impl Field {
    /// Binds `meta` to `table`.
    pub fn new(table: Arc<Table>, meta: FieldMeta) -> Self {
        Self { table, meta }
    }

    /// The owning table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Name of the owning table.
    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    /// Column metadata.
    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Column name.
    pub fn field_name(&self) -> &str {
        self.meta.name()
    }

    /// Column type.
    pub fn attr_type(&self) -> AttrType {
        self.meta.attr_type()
    }

    /// Spec used to find this column in a tuple.
    pub fn cell_spec(&self) -> TupleCellSpec {
        TupleCellSpec::new(self.table_name(), self.field_name())
    }

    /// `field` or `table.field`.
    pub fn name(&self, with_table: bool) -> String {
        if with_table {
            format!("{}.{}", self.table_name(), self.field_name())
        } else {
            self.field_name().to_string()
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.table_name() == other.table_name() && self.field_name() == other.field_name()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({}.{})", self.table_name(), self.field_name())
    }
}
