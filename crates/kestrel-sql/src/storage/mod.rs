//! In-memory storage surface consumed by the engine.
//!
//! Tables hold fixed-size records. A record is a shared byte buffer; the
//! tuples handed out by table scans are live handles onto it, so an update
//! that writes a field is visible to every holder of the handle.
//!
//! ```text
//!   Db ──► Table ──► TableMeta (fields, offsets)
//!              └───► Record { rid, Arc<Mutex<Vec<u8>>> }
//! ```

mod catalog;
mod index_meta;
mod record;
mod table;
mod table_meta;
mod trx;

pub use catalog::Db;
pub use index_meta::IndexMeta;
pub use record::Record;
pub use table::Table;
pub use table_meta::{FieldMeta, TableMeta};
pub use trx::{Trx, TrxManager};
