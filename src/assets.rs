//! Build output assets and the script scanner.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

/// On-demand access to one asset's full text.
///
/// Assets are owned by the host build tool; the gate only ever reads them.
pub trait AssetSource: Send + Sync {
    fn source(&self) -> Result<String>;
}

/// Asset content held in memory. Used by embedders and tests.
pub struct InMemorySource(pub String);

impl AssetSource for InMemorySource {
    fn source(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Asset content read from disk when the validator asks for it. Used by
/// the CLI, which never loads the whole output set up front.
pub struct FileSource(pub PathBuf);

impl AssetSource for FileSource {
    fn source(&self) -> Result<String> {
        std::fs::read_to_string(&self.0)
            .with_context(|| format!("Failed to read asset file: {}", self.0.display()))
    }
}

const SCRIPT_SUFFIX: &str = ".js";

/// The finalized build output set: unique names mapped to content
/// accessors, kept in insertion order.
#[derive(Default, Clone)]
pub struct Assets {
    entries: Vec<(String, Arc<dyn AssetSource>)>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset. Inserting under an existing name replaces its
    /// source and keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, source: Arc<dyn AssetSource>) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = source;
        } else {
            self.entries.push((name, source));
        }
    }

    pub fn insert_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.insert(name, Arc::new(InMemorySource(text.into())));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AssetSource>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, source)| Arc::clone(source))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn AssetSource>)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Names of the script assets, in insertion order. Everything else
    /// (stylesheets, maps, licenses) never reaches a validator.
    pub fn script_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(name, _)| name.ends_with(SCRIPT_SUFFIX))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
