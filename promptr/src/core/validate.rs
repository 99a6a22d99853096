//! Structural validation of extracted operations.
//!
//! Validation is pure: it never touches the file system. Whether a delete
//! target exists is an apply-time concern; here we only establish that each
//! operation is well-formed and that its path cannot land outside the
//! working directory.

use std::path::Path;

use thiserror::Error;

use crate::core::operation::{OpKind, Operation, OperationBatch};
use crate::core::path::resolve_within;

/// A structural defect in a single operation. First failing check wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported operation kind '{kind}'")]
    UnsupportedKind { kind: String },
    #[error("unsafe path '{path}': must be relative and stay inside the working directory")]
    UnsafePath { path: String },
    #[error("missing content for {kind} of '{path}'")]
    MissingContent { kind: OpKind, path: String },
}

/// A batch rejection, pointing at the first invalid operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operation {index} is invalid: {error}")]
pub struct BatchValidationError {
    /// Zero-based position of the offending operation in the batch.
    pub index: usize,
    pub error: ValidationError,
}

/// Check a single operation for structural completeness and path safety.
///
/// Checks in order: recognized kind, safe relative path, content present for
/// kinds that write. The empty string is valid content (an empty file is a
/// legitimate intent).
pub fn validate_operation(root: &Path, op: &Operation) -> Result<(), ValidationError> {
    let kind = OpKind::parse(&op.kind).ok_or_else(|| ValidationError::UnsupportedKind {
        kind: op.kind.clone(),
    })?;
    if resolve_within(root, &op.path).is_none() {
        return Err(ValidationError::UnsafePath {
            path: op.path.clone(),
        });
    }
    if kind.writes_content() && op.content.is_none() {
        return Err(ValidationError::MissingContent {
            kind,
            path: op.path.clone(),
        });
    }
    Ok(())
}

/// Validate every operation in a batch, all-or-nothing.
///
/// A single invalid operation rejects the whole batch before any write
/// happens, so a partially valid batch can never produce partial effects.
pub fn validate_batch(root: &Path, batch: &OperationBatch) -> Result<(), BatchValidationError> {
    for (index, op) in batch.operations.iter().enumerate() {
        validate_operation(root, op)
            .map_err(|error| BatchValidationError { index, error })?;
    }
    Ok(())
}
