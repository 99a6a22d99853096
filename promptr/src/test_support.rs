//! Test-only helpers for constructing operations and run configs.

use crate::core::operation::Operation;
use crate::run::{Mode, RunConfig};

/// Create a content-bearing operation with the given wire kind.
pub fn write_op(kind: &str, path: &str, content: &str) -> Operation {
    Operation {
        kind: kind.to_string(),
        path: path.to_string(),
        content: Some(content.to_string()),
    }
}

/// Create a delete operation (no content).
pub fn delete_op(path: &str) -> Operation {
    Operation {
        kind: "delete".to_string(),
        path: path.to_string(),
        content: None,
    }
}

/// A deterministic interpret-mode config with default toggles.
pub fn interpret_config(prompt: &str) -> RunConfig {
    RunConfig {
        mode: Mode::Gpt4,
        prompt: prompt.to_string(),
        template_path: None,
        output_path: None,
        dry_run: false,
        auto_context: true,
        context_paths: Vec::new(),
    }
}

/// A fresh temp directory standing in for a project root.
pub fn project_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}
