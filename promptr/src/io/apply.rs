//! Applies validated operation batches to the file system.
//!
//! Operations run sequentially in batch order, with no parallelism and no
//! cross-batch transaction. Each operation is isolated: an I/O failure is
//! recorded in the report and the batch continues, unless the failure is
//! fatal (the file system itself is unusable), in which case the remainder
//! is skipped and reported as such.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::operation::{OpKind, Operation, OperationBatch};
use crate::core::path::resolve_within;

/// Outcome of applying one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    /// The file was written or removed.
    Applied,
    /// Delete of a path that did not exist. Soft warning, not a failure.
    SkippedMissing,
    /// This operation failed. A fatal failure means the file system itself
    /// is unusable and the rest of the batch is not attempted.
    Failed { reason: String, fatal: bool },
    /// Not attempted because an earlier operation failed fatally.
    SkippedAfterFatal,
}

impl OpOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            fatal: false,
        }
    }

    fn failed_io(err: &std::io::Error, action: &str) -> Self {
        Self::Failed {
            reason: format!("{action}: {err}"),
            fatal: is_fatal_kind(err.kind()),
        }
    }
}

/// Per-operation entry in an [`ApplyReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpReport {
    /// Wire kind string, kept verbatim so defects are attributed faithfully.
    pub kind: String,
    pub path: String,
    pub outcome: OpOutcome,
}

/// What happened to each operation of one batch, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub ops: Vec<OpReport>,
}

impl ApplyReport {
    /// Count of successfully applied operations of `kind`.
    pub fn applied(&self, kind: OpKind) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind == kind.as_str() && op.outcome == OpOutcome::Applied)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| {
                matches!(
                    op.outcome,
                    OpOutcome::Failed { .. } | OpOutcome::SkippedAfterFatal
                )
            })
            .count()
    }

    /// A batch fully applies when no operation failed or was skipped after a
    /// fatal error. Soft-skipped deletes still count as success.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Apply a validated batch beneath `root`, in list order.
///
/// Path containment is re-checked per operation before any write, so even a
/// batch that bypassed validation cannot touch anything outside `root`.
pub fn apply_batch(root: &Path, batch: &OperationBatch) -> ApplyReport {
    let mut report = ApplyReport::default();
    let mut fatal = false;
    for op in &batch.operations {
        if fatal {
            report.ops.push(OpReport {
                kind: op.kind.clone(),
                path: op.path.clone(),
                outcome: OpOutcome::SkippedAfterFatal,
            });
            continue;
        }
        let outcome = apply_operation(root, op);
        if let OpOutcome::Failed {
            reason,
            fatal: op_fatal,
        } = &outcome
        {
            warn!(path = %op.path, kind = %op.kind, %reason, fatal = op_fatal, "operation failed");
            fatal = *op_fatal;
        }
        report.ops.push(OpReport {
            kind: op.kind.clone(),
            path: op.path.clone(),
            outcome,
        });
    }
    report
}

fn apply_operation(root: &Path, op: &Operation) -> OpOutcome {
    // Unrecognized kinds cannot reach here through validation; stay
    // defensive for batches applied without it.
    let Some(kind) = OpKind::parse(&op.kind) else {
        return OpOutcome::failed(format!("unsupported kind '{}'", op.kind));
    };
    let Some(target) = resolve_within(root, &op.path) else {
        return OpOutcome::failed(format!("path '{}' escapes the working directory", op.path));
    };
    match kind {
        OpKind::Create | OpKind::Update => write_file(op, &target),
        OpKind::Delete => delete_file(&target),
    }
}

fn write_file(op: &Operation, target: &Path) -> OpOutcome {
    // Validation guarantees content for create/update; stay defensive for
    // batches applied without it.
    let Some(content) = op.content.as_deref() else {
        return OpOutcome::failed("missing content");
    };
    if let Some(parent) = target.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            return OpOutcome::failed_io(&err, "create parent directory");
        }
    }
    match fs::write(target, content) {
        Ok(()) => {
            debug!(path = %target.display(), bytes = content.len(), "wrote file");
            OpOutcome::Applied
        }
        Err(err) => OpOutcome::failed_io(&err, "write file"),
    }
}

fn delete_file(target: &Path) -> OpOutcome {
    match fs::remove_file(target) {
        Ok(()) => {
            debug!(path = %target.display(), "deleted file");
            OpOutcome::Applied
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %target.display(), "delete target does not exist");
            OpOutcome::SkippedMissing
        }
        Err(err) => OpOutcome::failed_io(&err, "delete file"),
    }
}

/// I/O conditions that make the rest of the batch pointless to attempt.
fn is_fatal_kind(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::PermissionDenied | ErrorKind::StorageFull | ErrorKind::ReadOnlyFilesystem
    )
}
