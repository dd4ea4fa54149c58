//! Table catalog.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use kestrel_common::config::StorageConfig;
use kestrel_common::{KestrelError, KestrelResult};

use super::{Table, TableMeta};
use crate::parser::AttrInfo;
use crate::value::AttrType;

/// A database: a named set of tables.
#[derive(Debug)]
pub struct Db {
    name: String,
    storage: StorageConfig,
    tables: RwLock<HashMap<String, Arc<Table>>>,
    next_table_id: AtomicU32,
}

impl Db {
    /// Creates an empty database.
    pub fn new(name: impl Into<String>, storage: StorageConfig) -> Self {
        Self {
            name: name.into(),
            storage,
            tables: RwLock::new(HashMap::new()),
            next_table_id: AtomicU32::new(1),
        }
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a table. CHARS columns declared without a length get the
    /// configured default.
    pub fn create_table(&self, name: &str, attrs: &[AttrInfo]) -> KestrelResult<Arc<Table>> {
        let resolved = attrs
            .iter()
            .map(|attr| self.resolve_attr(attr))
            .collect::<KestrelResult<Vec<_>>>()?;

        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(KestrelError::invalid_argument(format!(
                "table '{name}' already exists"
            )));
        }

        let table_id = self.next_table_id.fetch_add(1, Ordering::Relaxed);
        let table = Arc::new(Table::new(TableMeta::new(table_id, name, &resolved)?));
        tables.insert(name.to_string(), Arc::clone(&table));
        info!(db = %self.name, table = name, table_id, "created table");
        Ok(table)
    }

    fn resolve_attr(&self, attr: &AttrInfo) -> KestrelResult<AttrInfo> {
        if attr.attr_type != AttrType::Chars {
            return Ok(attr.clone());
        }
        let length = if attr.length == 0 {
            self.storage.default_char_length
        } else {
            attr.length
        };
        if length > self.storage.max_char_length {
            return Err(KestrelError::invalid_argument(format!(
                "column '{}' length {length} exceeds {}",
                attr.name, self.storage.max_char_length
            )));
        }
        Ok(AttrInfo {
            length,
            ..attr.clone()
        })
    }

    /// Looks up a table by name.
    pub fn find_table(&self, name: &str) -> Option<Arc<Table>> {
        self.tables.read().get(name).cloned()
    }

    /// Sorted table names.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}
