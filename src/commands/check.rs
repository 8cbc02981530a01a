use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use es5check::assets::{Assets, FileSource};
use es5check::config::Config;
use es5check::gate::EmitGate;

pub fn check_command(
    dir: &str,
    config_path: Option<&str>,
    no_spawn: bool,
    validator: Option<&str>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };
    // CLI flags win over the config file
    if no_spawn {
        config.spawn = false;
    }
    if let Some(bin) = validator {
        config.validator = Some(PathBuf::from(bin));
    }

    let assets = collect_assets(Path::new(dir))?;
    println!("Checking {} output asset(s) in: {dir}", assets.len());

    let gate = EmitGate::new(&config)?;

    // The gate's fan-out is cooperative; one thread of control is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(gate.run(&assets))
}

/// Walks the output directory and names each file by its relative path,
/// sorted so the selection order is stable across filesystems.
fn collect_assets(root: &Path) -> Result<Assets> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry
            .with_context(|| format!("Failed to walk output directory: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(root)
            .context("Walked outside the output directory")?
            .to_string_lossy()
            .replace('\\', "/");
        files.push((name, entry.path().to_path_buf()));
    }
    files.sort();

    let mut assets = Assets::new();
    for (name, path) in files {
        assets.insert(name, Arc::new(FileSource(path)));
    }
    Ok(assets)
}
