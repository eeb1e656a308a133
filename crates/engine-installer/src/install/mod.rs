//! Concrete engine installers.
//!
//! Each registry kind contributes a producer (the registry-specific steps
//! that populate a fresh lib directory); the version check and the
//! backup/commit/rollback protocol are shared.

mod maven;
mod pypi;

use std::path::PathBuf;

use tracing::{error, info, warn};

pub use maven::MavenEngineInstaller;
pub use pypi::{PackageProvisioner, PipProvisioner, PypiEngineInstaller};

use crate::atomic::{self, InstallAttempt};
use crate::error::Result;
use crate::layout::EnginesRoot;
use crate::registry::RegistryClient;
use crate::state;

/// Where an engine's artifacts are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// A Python package index, identified by package name.
    Pypi { package: String },
    /// A Maven repository, identified by group and artifact id.
    Maven {
        group_id: String,
        artifact_id: String,
    },
}

/// Install the latest published version of `product` from `source`.
///
/// Returns the installed engine root, or `None` when the registry could
/// not be reached, the latest version is already installed, or the install
/// failed (and was rolled back).
pub fn install_from_registry(
    root: &EnginesRoot,
    product: &str,
    source: RegistrySource,
) -> Option<PathBuf> {
    match source {
        RegistrySource::Pypi { package } => {
            PypiEngineInstaller::new(root.clone(), product, package).install()
        }
        RegistrySource::Maven {
            group_id,
            artifact_id,
        } => MavenEngineInstaller::new(root.clone(), product, group_id, artifact_id).install(),
    }
}

/// Resolve the latest version, skip if already installed, then drive the
/// atomic install protocol with `produce`.
pub(crate) fn install_latest<C, F>(
    root: &EnginesRoot,
    product: &str,
    registry: &C,
    produce: F,
) -> Option<PathBuf>
where
    C: RegistryClient,
    F: FnOnce(&InstallAttempt) -> Result<()>,
{
    let Some(latest) = registry.latest_version() else {
        warn!(product, "could not determine the latest version");
        error!(product, "failed to install engine");
        return None;
    };
    if state::installed_version(root, product).as_deref() == Some(latest.as_str()) {
        info!(product, version = %latest, "already installed");
        return None;
    }
    info!(product, version = %latest, "installing engine");
    let installed = atomic::install_with_rollback(root, product, &latest, produce);
    if installed.is_some() {
        info!(product, version = %latest, "successfully installed");
    }
    installed
}
