//! Prompt rendering via minijinja templates.
//!
//! The default template carries the refactor contract: it instructs the
//! model to answer with the operations payload the extractor expects. A user
//! template loaded with `--template` receives the same variables (`prompt`,
//! `context`) and replaces the default wholesale.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use minijinja::{Environment, context};
use tracing::debug;

use crate::io::context::PromptContext;

const REFACTOR_TEMPLATE: &str = include_str!("templates/refactor.md");

/// A loaded prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: &'static str,
    text: String,
}

impl PromptTemplate {
    /// The embedded refactor template, used when no `--template` is given.
    pub fn refactor() -> Self {
        Self {
            name: "refactor",
            text: REFACTOR_TEMPLATE.to_string(),
        }
    }

    /// Load a user template from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?;
        Ok(Self {
            name: "user",
            text,
        })
    }

    /// Render the template with the user prompt and gathered file context.
    pub fn render(&self, prompt: &str, file_context: &PromptContext) -> Result<String> {
        let mut env = Environment::new();
        env.add_template(self.name, &self.text)
            .with_context(|| format!("parse {} template", self.name))?;
        let template = env.get_template(self.name)?;
        let rendered = template.render(context! {
            prompt => prompt.trim(),
            context => file_context,
        })?;
        debug!(template = self.name, bytes = rendered.len(), "rendered prompt");
        Ok(rendered)
    }
}
