//! # kestrel-test
//!
//! End-to-end tests for kestrel.
//!
//! This crate contains:
//! - Fixtures that build a database, create tables and load rows
//! - Statement scenarios under `tests/`

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Database fixtures
pub mod fixtures;
