//! System-wide constants for kestrel.

// =============================================================================
// Schema Constants
// =============================================================================

/// Name of the hidden system field stamped with the inserting transaction.
pub const SYS_FIELD_NAME: &str = "__trx";

/// Byte length of the hidden system field.
pub const SYS_FIELD_LEN: usize = 4;

/// Byte length of ints, floats, dates and booleans in a record.
pub const FIXED_FIELD_LEN: usize = 4;

/// Default declared length for CHARS columns.
pub const DEFAULT_CHAR_LENGTH: usize = 4;

/// Upper bound for a declared CHARS column length.
pub const MAX_CHAR_LENGTH: usize = 65_535;

// =============================================================================
// Value Constants
// =============================================================================

/// Tolerance used when comparing floats for equality.
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Smallest year a DATE value may carry.
pub const MIN_DATE_YEAR: u32 = 1;

/// Largest year a DATE value may carry.
pub const MAX_DATE_YEAR: u32 = 9999;

// =============================================================================
// Execution Constants
// =============================================================================

/// Column header used by EXPLAIN output.
pub const EXPLAIN_COLUMN: &str = "Query Plan";

/// Separator between cells in text result sets.
pub const CELL_SEPARATOR: &str = " | ";
