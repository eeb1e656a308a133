//! Maven engine installer.
//!
//! The payload is a single executable Java archive. The producer downloads
//! it into the fresh lib directory, lifts the engine descriptor out of the
//! archive's `lsp/config.yml` entry, and persists the version record.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use engine_config::DESCRIPTOR_FILENAME;

use super::install_latest;
use crate::atomic::InstallAttempt;
use crate::error::{Error, Result};
use crate::layout::EnginesRoot;
use crate::registry::{MavenCoordinates, MavenRegistry, RegistryClient};
use crate::state;

/// Archive entry holding the engine descriptor.
const ARCHIVE_DESCRIPTOR_ENTRY: &str = "lsp/config.yml";

/// Installs an engine published as a Maven artifact.
pub struct MavenEngineInstaller<C = MavenRegistry> {
    root: EnginesRoot,
    product: String,
    artifact_id: String,
    registry: C,
}

impl MavenEngineInstaller {
    /// Installer resolving against Maven Central.
    pub fn new(
        root: EnginesRoot,
        product: impl Into<String>,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Self {
        let artifact_id = artifact_id.into();
        let registry = MavenRegistry::new(MavenCoordinates::new(group_id, artifact_id.clone()));
        Self::with_registry(root, product, artifact_id, registry)
    }
}

impl<C: RegistryClient> MavenEngineInstaller<C> {
    /// Installer with an explicit registry client. Tests inject doubles here.
    pub fn with_registry(
        root: EnginesRoot,
        product: impl Into<String>,
        artifact_id: impl Into<String>,
        registry: C,
    ) -> Self {
        Self {
            root,
            product: product.into(),
            artifact_id: artifact_id.into(),
            registry,
        }
    }

    /// Install the latest published version, if newer than what is installed.
    pub fn install(&self) -> Option<PathBuf> {
        install_latest(&self.root, &self.product, &self.registry, |attempt| {
            self.produce(attempt)
        })
    }

    fn produce(&self, attempt: &InstallAttempt) -> Result<()> {
        let jar_path = attempt.lib_dir.join(format!("{}.jar", self.artifact_id));
        if !self.registry.download(&attempt.version, &jar_path) {
            return Err(Error::ArtifactUnavailable {
                coordinates: format!("{}:{}", self.artifact_id, attempt.version),
            });
        }
        extract_descriptor(&jar_path, &attempt.lib_dir)?;
        state::write_version_record(&attempt.engine_root, &attempt.version)
    }
}

/// Extract `lsp/config.yml` from the archive into `lib/config.yml`.
///
/// The entry is staged under `lib/lsp/` first, then moved up and the
/// emptied staging directory removed.
fn extract_descriptor(jar_path: &Path, lib_dir: &Path) -> Result<()> {
    let file = File::open(jar_path).map_err(|e| Error::io(jar_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|_| Error::ArtifactUnavailable {
        coordinates: jar_path.display().to_string(),
    })?;
    let mut entry = match archive.by_name(ARCHIVE_DESCRIPTOR_ENTRY) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(Error::structural(
                jar_path,
                format!("archive is missing its '{ARCHIVE_DESCRIPTOR_ENTRY}' entry"),
            ));
        }
        Err(_) => {
            return Err(Error::ArtifactUnavailable {
                coordinates: jar_path.display().to_string(),
            });
        }
    };

    let staging_dir = lib_dir.join("lsp");
    fs::create_dir_all(&staging_dir).map_err(|e| Error::io(&staging_dir, e))?;
    let staged = staging_dir.join(DESCRIPTOR_FILENAME);
    let mut out = File::create(&staged).map_err(|e| Error::io(&staged, e))?;
    io::copy(&mut entry, &mut out).map_err(|e| Error::io(&staged, e))?;
    drop(out);
    drop(entry);

    let descriptor = lib_dir.join(DESCRIPTOR_FILENAME);
    fs::rename(&staged, &descriptor).map_err(|e| Error::io(&descriptor, e))?;
    fs::remove_dir(&staging_dir).map_err(|e| Error::io(&staging_dir, e))?;
    Ok(())
}
