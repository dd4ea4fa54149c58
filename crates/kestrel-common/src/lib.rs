//! # kestrel-common
//!
//! Common errors, configuration, and identifiers for kestrel.
//!
//! This crate provides the foundation shared by the query engine and its
//! test harness:
//!
//! - **Errors**: the closed status taxonomy (`KestrelError`, `ErrorCode`)
//! - **Config**: engine configuration loaded from TOML
//! - **Logging**: `tracing` subscriber setup driven by the config
//! - **Constants**: system-wide constants and limits
//!
//! ## Example
//!
//! ```rust
//! use kestrel_common::error::{KestrelError, KestrelResult};
//! use kestrel_common::types::TxnId;
//!
//! fn example() -> KestrelResult<TxnId> {
//!     let txn = TxnId::new(1);
//!     if !txn.is_valid() {
//!         return Err(KestrelError::internal("invalid transaction"));
//!     }
//!     Ok(txn.next())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod types;

pub use constants::*;
pub use error::{ErrorCode, KestrelError, KestrelResult};
pub use types::{RecordId, TxnId};
