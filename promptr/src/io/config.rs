//! Tool defaults stored in `.promptr.toml` at the project root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

pub const CONFIG_FILE: &str = ".promptr.toml";

/// Per-project defaults (TOML). Command-line flags override every field.
///
/// The file is written by humans and optional; missing fields (or a missing
/// file) fall back to defaults.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PromptrConfig {
    /// Mode used when `--mode` is not given (`gpt3` or `gpt4`).
    pub default_mode: String,

    /// Template file used when `--template` is not given.
    pub template: Option<PathBuf>,

    /// Whether files mentioned in the prompt are pulled into the context.
    pub auto_context: bool,
}

impl Default for PromptrConfig {
    fn default() -> Self {
        Self {
            default_mode: "gpt4".to_string(),
            template: None,
            auto_context: true,
        }
    }
}

impl PromptrConfig {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.default_mode.as_str(), "gpt3" | "gpt4") {
            return Err(anyhow!(
                "default_mode must be 'gpt3' or 'gpt4', got '{}'",
                self.default_mode
            ));
        }
        Ok(())
    }
}

/// Load config from `root/.promptr.toml`.
///
/// A missing file yields `PromptrConfig::default()`.
pub fn load_config(root: &Path) -> Result<PromptrConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(PromptrConfig::default());
    }
    let contents = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PromptrConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
