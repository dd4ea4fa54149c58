//! Error handling for kestrel.
//!
//! Every fallible operation in the engine returns a [`KestrelResult`]. The
//! error variants form a closed taxonomy and each maps onto a stable
//! [`ErrorCode`] that the statement executor reports to its caller.

mod database;

pub use database::{ErrorCode, KestrelError};

/// Result type alias for kestrel operations.
pub type KestrelResult<T> = std::result::Result<T, KestrelError>;
