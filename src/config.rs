//! Gate settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::validation::StrategyKind;

/// Settings for one gate run, loadable from a JSON file and overridable
/// from CLI flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Validate by spawning the external validator process (true, the
    /// default) or by parsing in-process (false).
    pub spawn: bool,

    /// Path to an acorn-compatible validator binary. When unset the
    /// spawned strategy looks for `acorn` on PATH.
    pub validator: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spawn: true,
            validator: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// The strategy selected for this run; fixed for every asset in it.
    pub fn strategy(&self) -> StrategyKind {
        if self.spawn {
            StrategyKind::Spawned
        } else {
            StrategyKind::InProcess
        }
    }
}
