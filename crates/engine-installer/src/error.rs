use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Errors that abort an install attempt and trigger rollback.
///
/// Two failure classes are deliberately absent: a registry that cannot be
/// reached resolves to "no latest version" (the install is skipped before
/// any filesystem change), and a corrupt version record reads as "not
/// installed". Neither is surfaced as an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Artifact download failed or produced no usable file.
    #[error("artifact unavailable: {coordinates}")]
    ArtifactUnavailable { coordinates: String },

    /// An expected file or directory was missing after an otherwise
    /// successful fetch, extract, or build step.
    #[error("{reason}: {path}")]
    StructuralViolation { path: PathBuf, reason: String },

    /// A subprocess exited with a non-zero status.
    #[error("`{command}` exited with {status}")]
    ProcessFailure { command: String, status: ExitStatus },

    /// A subprocess could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    ProcessSpawn {
        command: String,
        source: std::io::Error,
    },

    /// No usable Python interpreter was found on PATH.
    #[error("no python interpreter found on PATH")]
    InterpreterNotFound,

    /// The engine is not known to discovery.
    #[error("no such engine: {0}")]
    UnknownEngine(String),

    /// I/O error reading or writing engine files.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the version record.
    #[error("failed to write version record: {0}")]
    State(#[from] serde_json::Error),
}

impl Error {
    /// Attach a path to an I/O error.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// A missing-file/missing-directory violation at `path`.
    pub fn structural(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::StructuralViolation {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
