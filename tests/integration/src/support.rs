//! Shared fixtures for install lifecycle tests.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use engine_installer::RegistryClient;
use tracing_subscriber::EnvFilter;
use zip::write::FileOptions;

/// Route install logs through the test harness, honoring `RUST_LOG`.
/// Safe to call from every test; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Registry double serving a fixed version and an in-memory jar.
pub struct FakeRegistry {
    version: Option<String>,
    jar: Option<Vec<u8>>,
}

impl FakeRegistry {
    pub fn serving(version: &str, jar: Vec<u8>) -> Self {
        Self {
            version: Some(version.to_string()),
            jar: Some(jar),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            version: None,
            jar: None,
        }
    }
}

impl RegistryClient for FakeRegistry {
    fn latest_version(&self) -> Option<String> {
        self.version.clone()
    }

    fn download(&self, _version: &str, target: &Path) -> bool {
        match &self.jar {
            Some(bytes) => {
                fs::write(target, bytes).unwrap();
                true
            }
            None => false,
        }
    }
}

/// Build an engine jar holding `descriptor` at `lsp/config.yml`.
pub fn engine_jar(descriptor: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("lsp/config.yml", FileOptions::default())
        .unwrap();
    writer.write_all(descriptor.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
