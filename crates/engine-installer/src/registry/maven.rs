//! Maven artifact repository registry client.
//!
//! Follows the standard repository layout: group id dots map to path
//! segments, versions are listed in `maven-metadata.xml`, and artifacts
//! live at `<repo>/<group-path>/<artifact>/<version>/<artifact>-<version>
//! [-<classifier>].<extension>`.

use std::path::Path;

use tracing::{debug, error, info, warn};

use super::RegistryClient;

/// Maven Central, base URL.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// Identity of a Maven artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: Option<String>,
    pub extension: String,
}

impl MavenCoordinates {
    /// Coordinates with no classifier and the default `jar` extension.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: None,
            extension: "jar".to_string(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    fn display(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// Resolves and fetches artifacts from a Maven repository.
#[derive(Debug, Clone)]
pub struct MavenRegistry {
    coordinates: MavenCoordinates,
    repo_url: String,
}

impl MavenRegistry {
    /// Client against Maven Central.
    pub fn new(coordinates: MavenCoordinates) -> Self {
        Self::with_repo_url(coordinates, MAVEN_CENTRAL_URL)
    }

    /// Client against an explicit repository URL. Tests point this at doubles.
    pub fn with_repo_url(coordinates: MavenCoordinates, repo_url: impl Into<String>) -> Self {
        Self {
            coordinates,
            repo_url: repo_url.into(),
        }
    }

    fn artifact_base_url(&self) -> String {
        let group_path = self.coordinates.group_id.replace('.', "/");
        format!(
            "{}/{}/{}",
            self.repo_url, group_path, self.coordinates.artifact_id
        )
    }

    /// URL of the artifact's `maven-metadata.xml`.
    pub fn metadata_url(&self) -> String {
        format!("{}/maven-metadata.xml", self.artifact_base_url())
    }

    /// URL of the artifact file for `version`.
    pub fn artifact_url(&self, version: &str) -> String {
        let classifier = self
            .coordinates
            .classifier
            .as_deref()
            .map(|c| format!("-{c}"))
            .unwrap_or_default();
        format!(
            "{}/{version}/{}-{version}{classifier}.{}",
            self.artifact_base_url(),
            self.coordinates.artifact_id,
            self.coordinates.extension
        )
    }

    /// Pick the newest version out of repository metadata: the `release`
    /// element, else `latest`, else the last entry under `versions`.
    fn pick_release_version(metadata: &str) -> Option<String> {
        let doc = roxmltree::Document::parse(metadata).ok()?;
        let versioning = doc
            .descendants()
            .find(|n| n.has_tag_name("versioning"))?;
        for label in ["release", "latest"] {
            let version = versioning
                .children()
                .find(|n| n.has_tag_name(label))
                .and_then(|n| n.text())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(version) = version {
                return Some(version.to_string());
            }
        }
        versioning
            .children()
            .find(|n| n.has_tag_name("versions"))?
            .children()
            .filter(|n| n.has_tag_name("version"))
            .filter_map(|n| n.text())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .last()
            .map(str::to_string)
    }
}

impl RegistryClient for MavenRegistry {
    fn latest_version(&self) -> Option<String> {
        let url = self.metadata_url();
        let text = match reqwest::blocking::get(&url)
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
        {
            Ok(text) => text,
            Err(e) => {
                error!(
                    coordinates = %self.coordinates.display(),
                    "error while fetching maven metadata: {e}"
                );
                return None;
            }
        };
        debug!(coordinates = %self.coordinates.display(), "fetched maven metadata");
        Self::pick_release_version(&text)
    }

    fn download(&self, version: &str, target: &Path) -> bool {
        if target.exists() {
            warn!(
                coordinates = %self.coordinates.display(),
                version,
                target = %target.display(),
                "skipping download; target already exists"
            );
            return true;
        }
        let url = self.artifact_url(version);
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = match tempfile::NamedTempFile::new_in(dir) {
            Ok(temp) => temp,
            Err(e) => {
                error!("could not create temporary download file: {e}");
                return false;
            }
        };
        match reqwest::blocking::get(&url)
            .and_then(|r| r.error_for_status())
            .and_then(|mut r| r.copy_to(&mut temp))
        {
            Ok(_) => debug!(url = %url, "downloaded maven artifact"),
            Err(e) => {
                error!(
                    coordinates = %self.coordinates.display(),
                    version,
                    "unable to download maven artifact: {e}"
                );
                return false;
            }
        }
        debug!(target = %target.display(), "moving artifact into place");
        if let Err(e) = temp.persist(target) {
            error!(target = %target.display(), "could not move artifact into place: {e}");
            return false;
        }
        info!(
            coordinates = %self.coordinates.display(),
            version,
            "successfully downloaded artifact"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_metadata_url_maps_group_dots_to_slashes() {
        let registry = MavenRegistry::new(MavenCoordinates::new("com.acme.labs", "sql-engine"));
        assert_eq!(
            registry.metadata_url(),
            "https://repo.maven.apache.org/maven2/com/acme/labs/sql-engine/maven-metadata.xml"
        );
    }

    #[test]
    fn test_artifact_url_default_extension() {
        let registry = MavenRegistry::new(MavenCoordinates::new("com.acme", "sql-engine"));
        assert_eq!(
            registry.artifact_url("1.2.3"),
            "https://repo.maven.apache.org/maven2/com/acme/sql-engine/1.2.3/sql-engine-1.2.3.jar"
        );
    }

    #[test]
    fn test_artifact_url_with_classifier_and_extension() {
        let coordinates = MavenCoordinates::new("com.acme", "sql-engine")
            .with_classifier("with-dependencies")
            .with_extension("pom");
        let registry = MavenRegistry::with_repo_url(coordinates, "https://repo.test/maven2");
        assert_eq!(
            registry.artifact_url("1.2.3"),
            "https://repo.test/maven2/com/acme/sql-engine/1.2.3/sql-engine-1.2.3-with-dependencies.pom"
        );
    }

    #[test]
    fn test_pick_release_version_prefers_release() {
        let metadata = r#"
<metadata>
  <versioning>
    <latest>2.1.0-SNAPSHOT</latest>
    <release>2.0.0</release>
    <versions>
      <version>1.0.0</version>
      <version>2.0.0</version>
    </versions>
  </versioning>
</metadata>"#;
        assert_eq!(
            MavenRegistry::pick_release_version(metadata),
            Some("2.0.0".to_string())
        );
    }

    #[test]
    fn test_pick_release_version_falls_back_to_latest() {
        let metadata = r#"
<metadata>
  <versioning>
    <latest>2.1.0-SNAPSHOT</latest>
    <versions>
      <version>1.0.0</version>
    </versions>
  </versioning>
</metadata>"#;
        assert_eq!(
            MavenRegistry::pick_release_version(metadata),
            Some("2.1.0-SNAPSHOT".to_string())
        );
    }

    #[test]
    fn test_pick_release_version_falls_back_to_last_listed() {
        let metadata = r#"
<metadata>
  <versioning>
    <versions>
      <version>1.0</version>
      <version>2.0</version>
    </versions>
  </versioning>
</metadata>"#;
        assert_eq!(
            MavenRegistry::pick_release_version(metadata),
            Some("2.0".to_string())
        );
    }

    #[test]
    fn test_pick_release_version_absent_or_malformed() {
        assert_eq!(MavenRegistry::pick_release_version("<metadata/>"), None);
        assert_eq!(
            MavenRegistry::pick_release_version("<metadata><versioning/></metadata>"),
            None
        );
        assert_eq!(MavenRegistry::pick_release_version("not xml"), None);
    }

    #[test]
    fn test_download_skips_existing_target() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("engine.jar");
        fs::write(&target, b"already here").unwrap();

        let registry = MavenRegistry::with_repo_url(
            MavenCoordinates::new("com.acme", "sql-engine"),
            "https://unreachable.invalid/maven2",
        );
        assert!(registry.download("1.0.0", &target));
        assert_eq!(fs::read(&target).unwrap(), b"already here");
    }
}
