//! Engine error types.
//!
//! The variants mirror the status taxonomy surfaced by the statement
//! executor: invalid input, schema mismatches, out-of-range values,
//! internal contract violations and unimplemented features.

use std::fmt;
use thiserror::Error;

/// Status codes for categorizing outcomes.
///
/// These codes are stable and grouped by category in the high byte.
/// `Success` and `RecordEof` are not errors; they exist so callers can
/// report a status for every call, including a normal end of stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General (0x0000 - 0x00FF)
    /// Operation completed successfully.
    Success = 0x0000,
    /// Internal error (contract violation or bug).
    Internal = 0x0001,
    /// Feature or statement not implemented.
    Unimplemented = 0x0002,
    /// Malformed or inconsistent input.
    InvalidArgument = 0x0003,

    // I/O (0x0100 - 0x01FF)
    /// General I/O error.
    Io = 0x0100,

    // Schema (0x0200 - 0x02FF)
    /// Table does not exist.
    TableNotFound = 0x0200,
    /// Field does not exist or cannot be resolved.
    FieldNotFound = 0x0201,
    /// Wrong number of values for a table.
    FieldCountMismatch = 0x0202,
    /// Value type incompatible with a field.
    FieldTypeMismatch = 0x0203,

    // Values (0x0300 - 0x03FF)
    /// Value out of range or otherwise invalid for its column.
    InvalidValue = 0x0300,

    // Execution (0x0400 - 0x04FF)
    /// Operator has no more records.
    RecordEof = 0x0400,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "I/O",
            0x02 => "Schema",
            0x03 => "Value",
            0x04 => "Execution",
            _ => "Unknown",
        }
    }

    /// Returns true for codes that do not signal a failure.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Success | Self::RecordEof)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for kestrel.
///
/// # Example
///
/// ```rust
/// use kestrel_common::error::{ErrorCode, KestrelError, KestrelResult};
///
/// fn lookup(table: &str) -> KestrelResult<()> {
///     Err(KestrelError::table_not_found(table))
/// }
///
/// let err = lookup("orders").unwrap_err();
/// assert_eq!(err.code(), ErrorCode::TableNotFound);
/// ```
#[derive(Debug, Error)]
pub enum KestrelError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Internal error - a broken operator contract or a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },

    /// Feature not implemented.
    #[error("not implemented: {feature}")]
    Unimplemented {
        /// The unimplemented feature.
        feature: String,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// I/O error from the underlying system.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    // ==========================================================================
    // Schema Errors
    // ==========================================================================
    /// Table not found.
    #[error("table '{table}' not found")]
    TableNotFound {
        /// The missing table.
        table: String,
    },

    /// Field not found.
    #[error("field '{field}' not found in table '{table}'")]
    FieldNotFound {
        /// The table name (may be empty when no table is in scope).
        table: String,
        /// The missing field.
        field: String,
    },

    /// Wrong number of values.
    #[error("table '{table}' expects {expected} values, got {actual}")]
    FieldCountMismatch {
        /// The table name.
        table: String,
        /// Number of user fields.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Value type cannot be stored in the field.
    #[error("field '{table}.{field}' has type {expected}, got {actual}")]
    FieldTypeMismatch {
        /// The table name.
        table: String,
        /// The field name.
        field: String,
        /// Declared field type.
        expected: String,
        /// Supplied value type.
        actual: String,
    },

    // ==========================================================================
    // Value Errors
    // ==========================================================================
    /// Value out of range or too long.
    #[error("invalid value: {message}")]
    InvalidValue {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl KestrelError {
    /// Returns the status code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal { .. } => ErrorCode::Internal,
            Self::Unimplemented { .. } => ErrorCode::Unimplemented,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::Io { .. } => ErrorCode::Io,
            Self::TableNotFound { .. } => ErrorCode::TableNotFound,
            Self::FieldNotFound { .. } => ErrorCode::FieldNotFound,
            Self::FieldCountMismatch { .. } => ErrorCode::FieldCountMismatch,
            Self::FieldTypeMismatch { .. } => ErrorCode::FieldTypeMismatch,
            Self::InvalidValue { .. } => ErrorCode::InvalidValue,
            Self::InvalidConfig { .. } => ErrorCode::InvalidArgument,
        }
    }

    /// Returns true if this error is one of the schema-mismatch kinds.
    #[must_use]
    pub const fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            Self::TableNotFound { .. }
                | Self::FieldNotFound { .. }
                | Self::FieldCountMismatch { .. }
                | Self::FieldTypeMismatch { .. }
        )
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates an unimplemented error.
    #[must_use]
    pub fn unimplemented(feature: impl Into<String>) -> Self {
        Self::Unimplemented {
            feature: feature.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Creates a table-not-found error.
    #[must_use]
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    /// Creates a field-not-found error.
    #[must_use]
    pub fn field_not_found(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
