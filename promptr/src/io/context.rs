//! File context gathered for prompt rendering.
//!
//! Context files come from two sources: paths named explicitly on the
//! command line, and paths mentioned inside the prompt itself
//! (auto-context). Both are read relative to the working directory and
//! rendered into the template as labeled blocks.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

/// One context file, path plus full contents, as handed to the template.
#[derive(Debug, Clone, Serialize)]
pub struct FileContext {
    pub path: String,
    pub contents: String,
}

/// All file context for one prompt.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext {
    pub files: Vec<FileContext>,
}

/// Read the named files into a [`PromptContext`], preserving argument order
/// and dropping duplicates.
pub fn build_context(root: &Path, paths: &[String]) -> Result<PromptContext> {
    let mut seen = BTreeSet::new();
    let mut files = Vec::new();
    for path in paths {
        if !seen.insert(path.clone()) {
            continue;
        }
        let contents = fs::read_to_string(root.join(path))
            .with_context(|| format!("read context file {path}"))?;
        files.push(FileContext {
            path: path.clone(),
            contents,
        });
    }
    debug!(count = files.len(), "built prompt context");
    Ok(PromptContext { files })
}

/// Collect path-looking tokens from the prompt that name existing files.
///
/// A token qualifies when it contains a `/` or a `.`, resolves to a regular
/// file under `root`, and is not an absolute path. Surrounding punctuation
/// and quotes are stripped before the check. Best-effort by design: missing
/// a mention costs context, never correctness.
pub fn auto_context_paths(root: &Path, prompt: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut paths = Vec::new();
    for token in prompt.split_whitespace() {
        let candidate = token.trim_matches(|c: char| !(c.is_alphanumeric() || "./_-".contains(c)));
        if candidate.is_empty()
            || candidate.starts_with('/')
            || !(candidate.contains('/') || candidate.contains('.'))
        {
            continue;
        }
        if root.join(candidate).is_file() && seen.insert(candidate.to_string()) {
            paths.push(candidate.to_string());
        }
    }
    debug!(count = paths.len(), "auto-context paths detected");
    paths
}
