//! Installation and version management for pluggable transpiler engines.
//!
//! An engine is a directory under a configurable engines root with a fixed
//! shape: a `lib` payload carrying the engine's `config.yml` descriptor and
//! runtime artifacts, and a `state` directory with the installed-version
//! record. This crate resolves the latest published version of an engine
//! from a remote registry (a Python package index or a Maven repository),
//! installs it atomically with rollback on failure, and enumerates the
//! engines already installed.
//!
//! The external transpiler-execution engine only ever reads a committed
//! `lib` directory; nothing here starts it.

pub mod atomic;
pub mod discovery;
pub mod error;
pub mod install;
pub mod layout;
pub mod registry;
pub mod state;

use std::collections::BTreeSet;
use std::path::PathBuf;

use engine_config::ConfigOption;

pub use atomic::{InstallAttempt, install_with_rollback};
pub use discovery::Discovery;
pub use error::{Error, Result};
pub use install::{
    MavenEngineInstaller, PackageProvisioner, PipProvisioner, PypiEngineInstaller, RegistrySource,
    install_from_registry,
};
pub use layout::EnginesRoot;
pub use registry::{MavenCoordinates, MavenRegistry, PypiRegistry, RegistryClient};
pub use state::{RootState, VersionRecord};

/// Version of `product` currently installed under `root`, if any.
///
/// A missing or malformed version record reads as "not installed".
pub fn installed_version(root: &EnginesRoot, product: &str) -> Option<String> {
    state::installed_version(root, product)
}

/// Names of all engines installed under `root`.
pub fn all_engine_names(root: &EnginesRoot) -> BTreeSet<String> {
    Discovery::new(root.clone()).engine_names()
}

/// Union of the dialects supported by all installed engines.
pub fn all_dialects(root: &EnginesRoot) -> BTreeSet<String> {
    Discovery::new(root.clone()).dialects()
}

/// Names of the installed engines that support `dialect`.
pub fn engines_supporting_dialect(root: &EnginesRoot, dialect: &str) -> BTreeSet<String> {
    Discovery::new(root.clone()).engines_supporting(dialect)
}

/// Configurable options `engine` declares for `dialect`.
pub fn config_options_for(root: &EnginesRoot, engine: &str, dialect: &str) -> Vec<ConfigOption> {
    Discovery::new(root.clone()).options_for(engine, dialect)
}

/// Path of the descriptor file for an installed `engine`.
pub fn config_path(root: &EnginesRoot, engine: &str) -> Result<PathBuf> {
    Discovery::new(root.clone()).config_path(engine)
}
