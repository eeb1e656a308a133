//! Python package index registry client.

use std::path::Path;

use tracing::{error, info};

use super::RegistryClient;

/// JSON API of the canonical package index.
pub const PYPI_INDEX_URL: &str = "https://pypi.org/pypi";

/// Mirror used for direct artifact downloads.
pub const PYPI_MIRROR_URL: &str = "https://pypi.debian.net";

/// Resolves and fetches a named package from a Python package index.
#[derive(Debug, Clone)]
pub struct PypiRegistry {
    package: String,
    /// Artifact kind: `whl`, `tar`, or a literal file extension.
    artifact_kind: String,
    index_url: String,
    mirror_url: String,
}

impl PypiRegistry {
    /// Client for `package` against the canonical index and mirror.
    pub fn new(package: impl Into<String>) -> Self {
        Self::with_urls(package, PYPI_INDEX_URL, PYPI_MIRROR_URL)
    }

    /// Client with explicit endpoint URLs. Tests point these at doubles.
    pub fn with_urls(
        package: impl Into<String>,
        index_url: impl Into<String>,
        mirror_url: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            artifact_kind: "whl".to_string(),
            index_url: index_url.into(),
            mirror_url: mirror_url.into(),
        }
    }

    /// Select the artifact kind to download (`whl` by default).
    pub fn with_artifact_kind(mut self, kind: impl Into<String>) -> Self {
        self.artifact_kind = kind.into();
        self
    }

    fn metadata_url(&self) -> String {
        format!("{}/{}/json", self.index_url, self.package)
    }

    /// Artifact filename: package dashes become underscores, and the suffix
    /// depends on the artifact kind (`-py3-none-any.whl` for wheels,
    /// `.tar.gz` for tarballs, `.<ext>` otherwise).
    fn artifact_filename(&self, version: &str) -> String {
        let suffix = match self.artifact_kind.as_str() {
            "whl" => "-py3-none-any.whl".to_string(),
            "tar" => ".tar.gz".to_string(),
            other => format!(".{other}"),
        };
        format!("{}-{version}{suffix}", self.package.replace('-', "_"))
    }

    fn artifact_url(&self, version: &str) -> String {
        format!(
            "{}/{}/{}",
            self.mirror_url,
            self.package,
            self.artifact_filename(version)
        )
    }

    /// Pull `info.version` out of an index JSON response body.
    fn parse_latest_version(body: &str) -> Option<String> {
        let data: serde_json::Value = serde_json::from_str(body).ok()?;
        data.get("info")?
            .get("version")?
            .as_str()
            .map(str::to_string)
    }

    fn fetch(url: &str) -> reqwest::Result<reqwest::blocking::Response> {
        reqwest::blocking::get(url)?.error_for_status()
    }
}

impl RegistryClient for PypiRegistry {
    fn latest_version(&self) -> Option<String> {
        let url = self.metadata_url();
        let body = match Self::fetch(&url).and_then(|r| r.text()) {
            Ok(body) => body,
            Err(e) => {
                error!(package = %self.package, "error while fetching index metadata: {e}");
                return None;
            }
        };
        Self::parse_latest_version(&body)
    }

    fn download(&self, version: &str, target: &Path) -> bool {
        let url = self.artifact_url(version);
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = match tempfile::NamedTempFile::new_in(dir) {
            Ok(temp) => temp,
            Err(e) => {
                error!("could not create temporary download file: {e}");
                return false;
            }
        };
        match Self::fetch(&url).and_then(|mut r| r.copy_to(&mut temp)) {
            Ok(_) => info!(url = %url, "successfully downloaded artifact"),
            Err(e) => {
                error!(url = %url, "while downloading from package index: {e}");
                return false;
            }
        }
        // A pre-existing target counts as already downloaded; the fetched
        // copy is discarded rather than overwriting it.
        if !target.exists() {
            info!(target = %target.display(), "moving downloaded artifact into place");
            if let Err(e) = temp.persist(target) {
                error!(target = %target.display(), "could not move artifact into place: {e}");
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wheel_filename_replaces_dashes() {
        let registry = PypiRegistry::new("acme-sql-transpiler");
        assert_eq!(
            registry.artifact_filename("0.3.1"),
            "acme_sql_transpiler-0.3.1-py3-none-any.whl"
        );
    }

    #[test]
    fn test_tarball_filename() {
        let registry = PypiRegistry::new("acme-sql-transpiler").with_artifact_kind("tar");
        assert_eq!(
            registry.artifact_filename("0.3.1"),
            "acme_sql_transpiler-0.3.1.tar.gz"
        );
    }

    #[test]
    fn test_other_extension_filename() {
        let registry = PypiRegistry::new("acme").with_artifact_kind("zip");
        assert_eq!(registry.artifact_filename("1.0.0"), "acme-1.0.0.zip");
    }

    #[test]
    fn test_metadata_and_artifact_urls() {
        let registry = PypiRegistry::with_urls("acme", "https://index.test/pypi", "https://mirror.test");
        assert_eq!(registry.metadata_url(), "https://index.test/pypi/acme/json");
        assert_eq!(
            registry.artifact_url("1.0.0"),
            "https://mirror.test/acme/acme-1.0.0-py3-none-any.whl"
        );
    }

    #[test]
    fn test_parse_latest_version() {
        let body = r#"{"info": {"name": "acme", "version": "2.4.0"}}"#;
        assert_eq!(
            PypiRegistry::parse_latest_version(body),
            Some("2.4.0".to_string())
        );
    }

    #[test]
    fn test_parse_latest_version_absent_or_malformed() {
        assert_eq!(PypiRegistry::parse_latest_version("{}"), None);
        assert_eq!(PypiRegistry::parse_latest_version(r#"{"info": {}}"#), None);
        assert_eq!(PypiRegistry::parse_latest_version("not json"), None);
    }
}
