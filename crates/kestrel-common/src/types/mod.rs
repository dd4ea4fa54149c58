//! Type definitions shared across kestrel crates.

mod ids;

pub use ids::{RecordId, TxnId};
