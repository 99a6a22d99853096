//! Wire types for model-emitted file operations.
//!
//! These types define the stable contract between the extractor, validator,
//! and applier. They carry no file-system state and must stay deterministic:
//! an [`OperationBatch`] is applied strictly in list order, exactly once.

use serde::{Deserialize, Serialize};

/// Recognized operation kinds. Anything else on the wire is rejected by
/// validation, never silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Update,
    Delete,
}

impl OpKind {
    /// Parse a wire `kind` string. Returns `None` for unrecognized kinds.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Whether this kind writes file content (as opposed to removing a file).
    pub fn writes_content(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file edit instruction as emitted by the model.
///
/// `kind` stays a raw string here so that an unrecognized kind survives
/// extraction and is reported by the validator against the specific
/// operation, with the rest of the batch intact for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// One of `create`, `update`, `delete` (checked by the validator).
    pub kind: String,
    /// File path relative to the invocation working directory.
    pub path: String,
    /// Full replacement text for `create`/`update`; absent for `delete`.
    /// The empty string is a valid value ("create an empty file").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// An ordered batch of operations from one model response or one piped
/// payload. Order is significant: a later operation on the same path wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBatch {
    pub operations: Vec<Operation>,
}

impl OperationBatch {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}
