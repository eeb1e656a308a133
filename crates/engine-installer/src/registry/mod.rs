//! Remote registries engines are resolved from.
//!
//! Both registry kinds expose the same narrow contract: resolve the newest
//! published version, and fetch a versioned artifact to a local path.
//! Transport failures are absorbed at this boundary: a registry that cannot
//! be reached resolves to "no version", and a failed download reports
//! `false`. Callers decide whether that skips or aborts an install.

mod maven;
mod pypi;

use std::path::Path;

pub use maven::{MAVEN_CENTRAL_URL, MavenCoordinates, MavenRegistry};
pub use pypi::{PYPI_INDEX_URL, PYPI_MIRROR_URL, PypiRegistry};

/// A remote source of versioned engine artifacts.
pub trait RegistryClient {
    /// The newest published version, if it can be determined.
    ///
    /// Network and parse failures are logged and yield `None`.
    fn latest_version(&self) -> Option<String>;

    /// Fetch the artifact for `version` to `target`.
    ///
    /// Implementations are idempotent: a pre-existing `target` is treated
    /// as already downloaded. Returns whether the artifact is in place.
    fn download(&self, version: &str, target: &Path) -> bool;
}
