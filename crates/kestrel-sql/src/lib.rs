//! # kestrel-sql
//!
//! Query compilation and execution for kestrel.
//!
//! This crate implements:
//! - Parse-tree nodes and statement binding
//! - Scalar values and expression evaluation
//! - Logical planning with predicate pushdown
//! - Lowering to physical operators and pull-based execution
//! - An in-memory storage surface the operators read and write

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Parse-tree nodes
pub mod parser;

/// Scalar values
pub mod value;

/// Tables, records and transactions
pub mod storage;

/// Expressions
pub mod expr;

/// Bound statements
pub mod stmt;

/// Logical plans
pub mod logical;

/// Physical operators
pub mod physical;

/// Statement execution
pub mod executor;
