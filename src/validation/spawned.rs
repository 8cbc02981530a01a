//! Isolated-process strategy: persist the asset text to a scoped temp
//! file and let an external acorn-compatible binary decide validity.
//!
//! Process isolation contains validator crashes and pathological-input
//! blowups that would otherwise take the whole build step down. One
//! process per asset, no pooling.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::Config;

pub const DEFAULT_VALIDATOR_BIN: &str = "acorn";

const ECMA_EDITION_FLAG: &str = "--ecma5";

/// Runs the external validator against one file on disk.
///
/// An explicit seam rather than a direct `Command` call so tests can
/// substitute a fake without spawning anything.
#[async_trait]
pub trait ValidatorRunner: Send + Sync {
    /// True iff the validator accepted the file (exit code 0). Any
    /// nonzero exit counts as invalid — a crashed validator is not
    /// distinguished from a genuine syntax error. Failing to spawn at
    /// all is an infrastructure error.
    async fn validate_file(&self, path: &Path) -> Result<bool>;
}

/// The real runner: `<bin> <file> --ecma5 --silent` with stdio suppressed.
/// No structured output is parsed; the exit status is the whole contract.
pub struct AcornRunner {
    bin: PathBuf,
}

impl AcornRunner {
    pub fn new(bin: PathBuf) -> Self {
        Self { bin }
    }

    /// Uses the configured binary when set, otherwise looks for `acorn`
    /// on PATH. A missing binary fails gate construction, not individual
    /// assets.
    pub fn discover(validator: Option<&Path>) -> Result<Self> {
        let bin = match validator {
            Some(path) => path.to_path_buf(),
            None => which::which(DEFAULT_VALIDATOR_BIN).with_context(|| {
                format!(
                    "`{DEFAULT_VALIDATOR_BIN}` not found on PATH; install it or set `validator` in the config"
                )
            })?,
        };
        debug!(bin = %bin.display(), "using external validator");
        Ok(Self { bin })
    }
}

#[async_trait]
impl ValidatorRunner for AcornRunner {
    async fn validate_file(&self, path: &Path) -> Result<bool> {
        let status = Command::new(&self.bin)
            .arg(path)
            .arg(ECMA_EDITION_FLAG)
            .arg("--silent")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .with_context(|| format!("Failed to spawn validator: {}", self.bin.display()))?;
        Ok(status.success())
    }
}

pub struct SpawnedValidator {
    runner: Box<dyn ValidatorRunner>,
}

impl SpawnedValidator {
    pub fn new(runner: Box<dyn ValidatorRunner>) -> Self {
        Self { runner }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let runner = AcornRunner::discover(config.validator.as_deref())?;
        Ok(Self::new(Box::new(runner)))
    }

    /// Writes `content` to a uniquely named `.js` scratch file, runs the
    /// validator against it, and removes the file on every path out of
    /// here: drop handles the error paths, the explicit close surfaces
    /// deletion failures on the normal one.
    pub async fn is_valid(&self, content: &str) -> Result<bool> {
        let mut file = tempfile::Builder::new()
            .prefix("es5check-")
            .suffix(".js")
            .tempfile()
            .context("Failed to create scratch file for the validator")?;
        file.write_all(content.as_bytes())
            .context("Failed to write scratch file")?;
        file.flush().context("Failed to flush scratch file")?;

        let valid = self.runner.validate_file(file.path()).await?;
        file.close().context("Failed to remove scratch file")?;
        Ok(valid)
    }
}
