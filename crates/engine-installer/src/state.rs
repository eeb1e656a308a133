//! Persisted per-engine version state.
//!
//! Each successfully installed engine carries a single JSON record at
//! `state/version.json` holding the installed version and install time.
//! A missing or malformed record means "not installed", never an error,
//! so a crashed or partial install can always be retried and overwritten.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::{EnginesRoot, STATE_DIR, VERSION_FILENAME};

/// The on-disk version record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Installed version with a leading `v` marker, e.g. `"v1.2.3"`.
    pub version: String,
    /// When the install completed, in UTC.
    pub date: DateTime<Utc>,
}

/// Probe result for an engine root ahead of an install attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootState {
    /// No directory exists for the engine.
    Absent,
    /// Directory exists with a valid version record.
    Installed,
    /// Directory exists but the version record is missing or malformed,
    /// e.g. after a crash mid-install. Safe to replace.
    Corrupt,
}

/// Read the installed version of `engine`, if any.
///
/// Returns `None` when the record file does not exist, cannot be read or
/// parsed, or its `version` field does not have the `v<digits...>` shape.
pub fn installed_version(root: &EnginesRoot, engine: &str) -> Option<String> {
    let path = root.version_file(engine);
    if !path.exists() {
        return None;
    }
    let text = fs::read_to_string(&path).ok()?;
    let record: VersionRecord = serde_json::from_str(&text).ok()?;
    parse_version_marker(&record.version)
}

/// Classify the current on-disk state of an engine root.
pub fn probe(root: &EnginesRoot, engine: &str) -> RootState {
    if !root.engine_root(engine).exists() {
        return RootState::Absent;
    }
    if installed_version(root, engine).is_some() {
        RootState::Installed
    } else {
        RootState::Corrupt
    }
}

/// Persist the version record for a freshly installed engine.
///
/// Creates the state directory, which must not already exist: this is only
/// ever called once per successful install, after the lib directory is
/// fully populated. Any failure here aborts the attempt and rolls back.
pub fn write_version_record(engine_root: &Path, version: &str) -> Result<()> {
    let state_dir = engine_root.join(STATE_DIR);
    fs::create_dir(&state_dir).map_err(|e| Error::io(&state_dir, e))?;
    let record = VersionRecord {
        version: format!("v{version}"),
        date: Utc::now(),
    };
    let mut content = serde_json::to_vec(&record)?;
    content.push(b'\n');
    let path = state_dir.join(VERSION_FILENAME);
    fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
    debug!(path = %path.display(), version, "wrote version record");
    Ok(())
}

/// Strip the leading `v` marker, rejecting versions that lack it or do not
/// continue with a digit.
fn parse_version_marker(version: &str) -> Option<String> {
    let stripped = version.strip_prefix('v')?;
    if !stripped.chars().next()?.is_ascii_digit() {
        return None;
    }
    Some(stripped.to_string())
}
