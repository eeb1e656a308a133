//! Atomic install driver: backup, install, commit or roll back.
//!
//! Both engine kinds install through this one state machine. An existing
//! install is renamed aside to a sibling backup, the new payload is built
//! in a fresh directory by a registry-specific producer, and the attempt
//! then either commits (backup deleted) or rolls back (fresh directory
//! deleted, backup renamed back). After any call the filesystem holds
//! either the new install or exactly the pre-call state, never a partial
//! directory and never two competing directories.
//!
//! The backup rename is not guarded by any cross-process lock: callers
//! must not run two installs of the same engine name concurrently.
//! Installs of different engine names touch disjoint trees and are safe.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, error, warn};

use crate::error::Result;
use crate::layout::{EnginesRoot, LIB_DIR};

/// Paths and identity for one install attempt, computed once and threaded
/// through the producer steps.
#[derive(Debug, Clone)]
pub struct InstallAttempt {
    /// Product name of the engine being installed.
    pub engine: String,
    /// Version being installed.
    pub version: String,
    /// The engine root being built.
    pub engine_root: PathBuf,
    /// The payload directory inside the engine root.
    pub lib_dir: PathBuf,
}

/// Run one backup/install/commit-or-rollback cycle for `engine`.
///
/// The producer populates the fresh lib directory and must return an error
/// if any required file ends up missing; any producer error triggers
/// rollback. Failures never propagate past this boundary: the caller sees
/// `None` and a logged error, with the previous install (if any) restored
/// byte-for-byte.
pub fn install_with_rollback<F>(
    root: &EnginesRoot,
    engine: &str,
    version: &str,
    producer: F,
) -> Option<PathBuf>
where
    F: FnOnce(&InstallAttempt) -> Result<()>,
{
    let engine_root = root.engine_root(engine);
    let backup = root.backup_dir(engine);

    // A stale backup from a crashed earlier attempt would collide with the
    // rename below. Clear it before touching anything else.
    if backup.exists() {
        debug!(backup = %backup.display(), "removing stale backup from a previous attempt");
        if let Err(e) = fs::remove_dir_all(&backup) {
            error!(backup = %backup.display(), "could not remove stale backup: {e}");
            return None;
        }
    }

    if engine_root.exists() {
        if let Err(e) = fs::rename(&engine_root, &backup) {
            error!(engine, "could not move existing install aside: {e}");
            return None;
        }
    }

    let attempt = InstallAttempt {
        engine: engine.to_string(),
        version: version.to_string(),
        lib_dir: engine_root.join(LIB_DIR),
        engine_root,
    };

    let prepared = fs::create_dir_all(&attempt.lib_dir);
    let outcome = match prepared {
        Ok(()) => producer(&attempt),
        Err(e) => Err(crate::error::Error::io(&attempt.lib_dir, e)),
    };

    match outcome {
        Ok(()) => {
            if backup.exists() {
                if let Err(e) = fs::remove_dir_all(&backup) {
                    warn!(backup = %backup.display(), "install committed but backup removal failed: {e}");
                }
            }
            Some(attempt.engine_root)
        }
        Err(e) => {
            error!(engine, version, "failed to install engine: {e}");
            if attempt.engine_root.exists() {
                if let Err(e) = fs::remove_dir_all(&attempt.engine_root) {
                    warn!(engine, "could not remove partial install: {e}");
                }
            }
            if backup.exists() {
                if let Err(e) = fs::rename(&backup, &attempt.engine_root) {
                    error!(engine, "could not restore previous install: {e}");
                }
            }
            None
        }
    }
}
