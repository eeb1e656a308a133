use std::path::PathBuf;

/// Errors that can occur while loading an engine descriptor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Descriptor file not found at the expected path.
    #[error("engine descriptor not found: {0}")]
    NotFound(PathBuf),

    /// Failed to parse descriptor YAML.
    #[error("failed to parse engine descriptor at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Descriptor parsed but violates a structural requirement.
    #[error("invalid engine descriptor at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    /// I/O error reading the descriptor file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
