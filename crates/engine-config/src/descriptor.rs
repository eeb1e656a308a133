//! Engine capability descriptor (`config.yml`) parsing.
//!
//! Every installed engine ships a descriptor inside its `lib` directory that
//! declares its display name, the source dialects it can transpile, and the
//! options a configuration layer may prompt for. The descriptor is consumed
//! read-only by the installer and discovery code.
//!
//! # Example YAML
//!
//! ```yaml
//! name: morpheus
//! dialects:
//!   - snowflake
//!   - oracle
//! options:
//!   all:
//!     - flag: "-experimental"
//!       method: confirm
//!       prompt: "Enable experimental conversion rules?"
//!       default: false
//!   snowflake:
//!     - flag: "-mode"
//!       method: choice
//!       prompt: "Conversion mode"
//!       choices: [strict, lenient]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options registered under this dialect key apply to every dialect.
pub const ALL_DIALECTS: &str = "all";

/// How a configuration layer should obtain the value for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMethod {
    /// Use the declared default without prompting.
    Force,
    /// Yes/no confirmation.
    Confirm,
    /// Free-form question.
    Question,
    /// Selection from a fixed list of choices.
    Choice,
}

/// A single configurable option declared by an engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigOption {
    /// Command-line flag the value is bound to.
    pub flag: String,
    /// How the value should be obtained.
    pub method: PromptMethod,
    /// Prompt text shown to the user.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Default value, if any.
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    /// Allowed values for [`PromptMethod::Choice`].
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

/// Complete engine descriptor loaded from a `config.yml` file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineDescriptor {
    /// Engine display name, used as the unique key in discovery.
    pub name: String,
    /// Source dialects this engine can transpile.
    #[serde(default)]
    pub dialects: Vec<String>,
    /// Configurable options keyed by dialect (or [`ALL_DIALECTS`]).
    #[serde(default)]
    pub options: HashMap<String, Vec<ConfigOption>>,
    /// Filesystem location the descriptor was loaded from.
    #[serde(skip)]
    pub path: PathBuf,
}

impl EngineDescriptor {
    /// Load and validate a descriptor from a `config.yml` file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let mut descriptor = Self::parse(&content, path)?;
        descriptor.path = path.to_path_buf();
        Ok(descriptor)
    }

    /// Parse descriptor YAML. `path` is used for error context only.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let descriptor: Self = serde_yaml::from_str(content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if descriptor.name.trim().is_empty() {
            return Err(Error::Invalid {
                path: path.to_path_buf(),
                reason: "descriptor 'name' must not be empty".to_string(),
            });
        }
        Ok(descriptor)
    }

    /// Options for `dialect`, falling back to the [`ALL_DIALECTS`] key.
    ///
    /// Returns an empty slice when neither key is present.
    pub fn options_for(&self, dialect: &str) -> &[ConfigOption] {
        self.options
            .get(dialect)
            .or_else(|| self.options.get(ALL_DIALECTS))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether this engine declares support for `dialect`.
    pub fn supports(&self, dialect: &str) -> bool {
        self.dialects.iter().any(|d| d == dialect)
    }
}
