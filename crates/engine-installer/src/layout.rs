//! Filesystem layout for installed engines.
//!
//! All components derive engine paths from an [`EnginesRoot`] instead of
//! constructing them ad hoc, so the on-disk conventions live in one place:
//!
//! ```text
//! <base>/<engine>/lib/config.yml      engine descriptor
//! <base>/<engine>/lib/...             runtime payload
//! <base>/<engine>/state/version.json  installed-version record
//! <base>/<engine>-saved/              transient backup during an install
//! ```

use std::path::{Path, PathBuf};

/// Directory holding an engine's installed payload.
pub const LIB_DIR: &str = "lib";

/// Directory holding an engine's persisted state.
pub const STATE_DIR: &str = "state";

/// Filename of the version record inside the state directory.
pub const VERSION_FILENAME: &str = "version.json";

/// Suffix appended to an engine root to form its backup path.
pub const BACKUP_SUFFIX: &str = "-saved";

/// The base directory under which all engines are installed.
///
/// Pure path arithmetic; no method here touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginesRoot {
    base: PathBuf,
}

impl EnginesRoot {
    /// Root at an explicit base directory. Tests inject a temp dir here.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The default per-user root: `~/.engine-manager/engines`.
    pub fn default_root() -> Option<Self> {
        dirs::home_dir().map(|home| Self::new(home.join(".engine-manager").join("engines")))
    }

    /// The base directory itself.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `<base>/<engine>`
    pub fn engine_root(&self, engine: &str) -> PathBuf {
        self.base.join(engine)
    }

    /// `<base>/<engine>/lib`
    pub fn lib_dir(&self, engine: &str) -> PathBuf {
        self.engine_root(engine).join(LIB_DIR)
    }

    /// `<base>/<engine>/state`
    pub fn state_dir(&self, engine: &str) -> PathBuf {
        self.engine_root(engine).join(STATE_DIR)
    }

    /// `<base>/<engine>/state/version.json`
    pub fn version_file(&self, engine: &str) -> PathBuf {
        self.state_dir(engine).join(VERSION_FILENAME)
    }

    /// `<base>/<engine>-saved`, the backup path used during an install.
    pub fn backup_dir(&self, engine: &str) -> PathBuf {
        self.base.join(format!("{engine}{BACKUP_SUFFIX}"))
    }
}
