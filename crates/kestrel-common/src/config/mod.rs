//! Configuration for kestrel.
//!
//! The engine reads a single TOML document split into sections for the
//! planner, the executor, column storage defaults and logging. Every field
//! has a default so a partial (or empty) file is valid.

mod engine;

pub use engine::{EngineConfig, ExecutionConfig, LoggingConfig, PlannerConfig, StorageConfig};
