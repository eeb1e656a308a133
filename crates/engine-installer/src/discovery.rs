//! Discovery of installed engines and their capabilities.
//!
//! Scans the engines root for directories that look like installed engines
//! (a `lib` subdirectory containing a `config.yml`) and answers capability
//! queries over their descriptors. Every query re-scans the filesystem, so
//! results are never stale across an install within the same process.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use engine_config::{ConfigOption, DESCRIPTOR_FILENAME, EngineDescriptor};
use tracing::error;

use crate::error::{Error, Result};
use crate::layout::{EnginesRoot, LIB_DIR};

/// Read-only view over the engines installed under a root.
#[derive(Debug, Clone)]
pub struct Discovery {
    root: EnginesRoot,
}

impl Discovery {
    pub fn new(root: EnginesRoot) -> Self {
        Self { root }
    }

    /// All valid engine descriptors under the root.
    ///
    /// Subdirectories without a `lib/config.yml` are silently skipped: not
    /// every directory under the root is an engine. A descriptor that fails
    /// to parse is logged and skipped without aborting the scan.
    pub fn scan(&self) -> Vec<EngineDescriptor> {
        let Ok(entries) = fs::read_dir(self.root.base()) else {
            return Vec::new();
        };
        let mut descriptors = Vec::new();
        for entry in entries.flatten() {
            if let Some(descriptor) = Self::descriptor_at(&entry.path()) {
                descriptors.push(descriptor);
            }
        }
        descriptors
    }

    fn descriptor_at(path: &Path) -> Option<EngineDescriptor> {
        if !path.is_dir() || !path.join(LIB_DIR).is_dir() {
            return None;
        }
        let config_path = path.join(LIB_DIR).join(DESCRIPTOR_FILENAME);
        if !config_path.is_file() {
            return None;
        }
        match EngineDescriptor::load(&config_path) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                error!(path = %config_path.display(), "could not load engine descriptor: {e}");
                None
            }
        }
    }

    /// Names of all installed engines.
    pub fn engine_names(&self) -> BTreeSet<String> {
        self.scan().into_iter().map(|d| d.name).collect()
    }

    /// Union of the dialects supported by all installed engines.
    pub fn dialects(&self) -> BTreeSet<String> {
        self.scan()
            .into_iter()
            .flat_map(|d| d.dialects)
            .collect()
    }

    /// Names of the engines that support `dialect`.
    pub fn engines_supporting(&self, dialect: &str) -> BTreeSet<String> {
        self.scan()
            .into_iter()
            .filter(|d| d.supports(dialect))
            .map(|d| d.name)
            .collect()
    }

    /// Configurable options `engine` declares for `dialect`.
    ///
    /// Unknown engines yield an empty list rather than an error, matching
    /// the graceful behavior expected by configuration layers.
    pub fn options_for(&self, engine: &str, dialect: &str) -> Vec<ConfigOption> {
        self.scan()
            .into_iter()
            .find(|d| d.name == engine)
            .map(|d| d.options_for(dialect).to_vec())
            .unwrap_or_default()
    }

    /// Path of the descriptor file for `engine`.
    pub fn config_path(&self, engine: &str) -> Result<PathBuf> {
        self.scan()
            .into_iter()
            .find(|d| d.name == engine)
            .map(|d| d.path)
            .ok_or_else(|| Error::UnknownEngine(engine.to_string()))
    }
}
