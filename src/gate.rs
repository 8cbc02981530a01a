//! Concurrent fan-out across the selected assets and the pass/fail gate
//! that turns per-asset results into a build verdict.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use thiserror::Error;
use tracing::debug;

use crate::assets::Assets;
use crate::config::Config;
use crate::validation::Validator;

/// The build-level failure. Raised exactly once per run, only when the
/// aggregate verdict names offending assets; infrastructure problems
/// travel as plain `anyhow` errors instead.
#[derive(Error, Debug)]
#[error("{} js file(s) are not ES5 compatible: {}", .names.len(), .names.join(", "))]
pub struct IncompatibleAssets {
    pub names: Vec<String>,
}

/// One asset's outcome. Bad syntax is data here, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub name: String,
    pub valid: bool,
}

/// The whole-run decision, derived from every per-asset result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    AllValid,
    SomeInvalid(Vec<String>),
}

impl Verdict {
    /// Offending names keep the selection order of `results`.
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let invalid: Vec<String> = results
            .iter()
            .filter(|result| !result.valid)
            .map(|result| result.name.clone())
            .collect();
        if invalid.is_empty() {
            Verdict::AllValid
        } else {
            Verdict::SomeInvalid(invalid)
        }
    }
}

/// Validates every named asset concurrently and joins all of them before
/// returning, so the report is always complete: one asset failing never
/// cancels the others, and there is no timeout on any of them. Results
/// come back in selection order regardless of completion order.
pub async fn check_assets(
    assets: &Assets,
    names: &[String],
    validator: &Arc<Validator>,
) -> Result<Vec<ValidationResult>> {
    let mut handles = Vec::with_capacity(names.len());
    for name in names {
        let name = name.clone();
        let source = assets
            .get(&name)
            .with_context(|| format!("Asset missing from the output set: {name}"))?;
        let validator = Arc::clone(validator);
        handles.push(tokio::spawn(async move {
            println!(
                "{}",
                format!("Checking whether `{name}` is ES5 compatible...").yellow()
            );
            let content = source.source()?;
            let valid = validator.is_valid(&content).await?;
            if !valid {
                println!("{}", format!("`{name}` is not ES5 compatible.").red());
            }
            Ok::<ValidationResult, anyhow::Error>(ValidationResult { name, valid })
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.context("Validation task panicked")??);
    }
    Ok(results)
}

/// The emit-time extension point: hand it the finalized asset map once,
/// after the bundler is done and before the build is considered complete.
/// `Ok` lets the build proceed; an error marks it failed.
pub struct EmitGate {
    validator: Arc<Validator>,
}

impl EmitGate {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            validator: Arc::new(Validator::from_config(config)?),
        })
    }

    /// Bypasses config-driven construction; the seam the tests use to
    /// inject fake runners.
    pub fn with_validator(validator: Validator) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }

    pub async fn run(&self, assets: &Assets) -> Result<()> {
        let names = assets.script_names();
        debug!(
            total = assets.len(),
            scripts = names.len(),
            strategy = ?self.validator.kind(),
            "running emit gate"
        );

        let results = check_assets(assets, &names, &self.validator).await?;
        match Verdict::from_results(&results) {
            Verdict::AllValid => {
                println!("{}", "All js files are ES5 compatible.".green());
                Ok(())
            }
            Verdict::SomeInvalid(names) => Err(IncompatibleAssets { names }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;

    use super::*;
    use crate::validation::{Es5Parser, SpawnedValidator, ValidatorRunner};

    fn in_process_gate() -> EmitGate {
        EmitGate::with_validator(Validator::InProcess(Es5Parser::new()))
    }

    fn incompatible_names(err: anyhow::Error) -> Vec<String> {
        err.downcast::<IncompatibleAssets>()
            .expect("expected a build-level gate failure")
            .names
    }

    #[tokio::test]
    async fn single_valid_asset_passes() {
        let mut assets = Assets::new();
        assets.insert_text("a.js", "var x = 1;");

        assert!(in_process_gate().run(&assets).await.is_ok());
    }

    #[tokio::test]
    async fn arrow_function_fails_the_build() {
        let mut assets = Assets::new();
        assets.insert_text("a.js", "let x = () => 1;");

        let err = in_process_gate().run(&assets).await.unwrap_err();
        assert_eq!(incompatible_names(err), vec!["a.js"]);
    }

    #[tokio::test]
    async fn non_script_assets_are_never_validated() {
        let mut assets = Assets::new();
        assets.insert_text("a.js", "var x=1;");
        // Not JS at all; would fail any syntax check if it were scanned.
        assets.insert_text("b.css", "body{}");

        assert!(in_process_gate().run(&assets).await.is_ok());
    }

    #[tokio::test]
    async fn failure_lists_exactly_the_invalid_assets_in_order() {
        let mut assets = Assets::new();
        assets.insert_text("bad1.js", "class A {}");
        assets.insert_text("good.js", "var ok = true;");
        assets.insert_text("bad2.js", "const n = 1;");

        let err = in_process_gate().run(&assets).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bad1.js"));
        assert!(message.contains("bad2.js"));
        assert_eq!(incompatible_names(err), vec!["bad1.js", "bad2.js"]);
    }

    #[tokio::test]
    async fn empty_asset_set_passes_vacuously() {
        assert!(in_process_gate().run(&Assets::new()).await.is_ok());
    }

    #[tokio::test]
    async fn verdict_is_idempotent_over_an_immutable_set() {
        let mut assets = Assets::new();
        assets.insert_text("a.js", "var x = `nope`;");

        let gate = in_process_gate();
        let first = incompatible_names(gate.run(&assets).await.unwrap_err());
        let second = incompatible_names(gate.run(&assets).await.unwrap_err());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn verdict_set_is_independent_of_insertion_order() {
        let sources = [
            ("a.js", "var fine = 1;"),
            ("b.js", "let bad = 1;"),
            ("c.js", "var also = { bad: 1 ** 2 };"),
        ];

        let mut forward = Assets::new();
        for (name, text) in sources {
            forward.insert_text(name, text);
        }
        let mut reversed = Assets::new();
        for (name, text) in sources.iter().rev() {
            reversed.insert_text(*name, *text);
        }

        let gate = in_process_gate();
        let mut first = incompatible_names(gate.run(&forward).await.unwrap_err());
        let mut second = incompatible_names(gate.run(&reversed).await.unwrap_err());
        assert_eq!(first, vec!["b.js", "c.js"]);
        assert_eq!(second, vec!["c.js", "b.js"]);
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }

    struct BrokenRunner;

    #[async_trait]
    impl ValidatorRunner for BrokenRunner {
        async fn validate_file(&self, _path: &Path) -> anyhow::Result<bool> {
            anyhow::bail!("validator binary vanished")
        }
    }

    #[tokio::test]
    async fn infrastructure_failure_aborts_instead_of_reporting_a_verdict() {
        let mut assets = Assets::new();
        assets.insert_text("a.js", "var x = 1;");

        let gate = EmitGate::with_validator(Validator::Spawned(SpawnedValidator::new(
            Box::new(BrokenRunner),
        )));
        let err = gate.run(&assets).await.unwrap_err();
        assert!(err.downcast_ref::<IncompatibleAssets>().is_none());
        assert!(err.to_string().contains("validator binary vanished"));
    }

    #[test]
    fn verdict_partitions_results() {
        let results = vec![
            ValidationResult {
                name: "a.js".into(),
                valid: true,
            },
            ValidationResult {
                name: "b.js".into(),
                valid: false,
            },
            ValidationResult {
                name: "c.js".into(),
                valid: false,
            },
        ];
        assert_eq!(
            Verdict::from_results(&results),
            Verdict::SomeInvalid(vec!["b.js".into(), "c.js".into()])
        );
        assert_eq!(Verdict::from_results(&[]), Verdict::AllValid);
    }
}
