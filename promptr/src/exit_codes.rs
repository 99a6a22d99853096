//! Stable exit codes for the promptr CLI.

/// Batch fully applied (including empty batches and soft-skipped deletes),
/// or a dry-run artifact was printed.
pub const OK: i32 = 0;
/// Config, template, model, extraction, or whole-batch validation failure.
/// Nothing was written to the file system.
pub const INVALID: i32 = 1;
/// The batch was applied but at least one operation failed.
pub const APPLY_FAILED: i32 = 2;
