//! Cross-crate install lifecycle scenarios.

mod support;

use std::fs;

use engine_config::EngineDescriptor;
use engine_installer::{
    EnginesRoot, Error, MavenEngineInstaller, all_engine_names, config_path,
    install_with_rollback, installed_version,
};
use pretty_assertions::assert_eq;
use support::{FakeRegistry, engine_jar, init_tracing};
use tempfile::TempDir;

#[test]
fn test_empty_root_then_install_then_discover() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let root = EnginesRoot::new(tmp.path());
    assert!(all_engine_names(&root).is_empty());

    let jar = engine_jar("name: demo\ndialects: [snowflake]\n");
    let registry = FakeRegistry::serving("1.2.3", jar);
    let installed = MavenEngineInstaller::with_registry(root.clone(), "demo", "a", registry)
        .install()
        .expect("install should succeed");

    assert_eq!(installed, root.engine_root("demo"));
    assert_eq!(installed_version(&root, "demo"), Some("1.2.3".to_string()));
    let names: Vec<_> = all_engine_names(&root).into_iter().collect();
    assert_eq!(names, vec!["demo"]);

    // The descriptor the install committed is loadable through the
    // config crate, the way a configuration layer would read it.
    let descriptor = EngineDescriptor::load(&config_path(&root, "demo").unwrap()).unwrap();
    assert_eq!(descriptor.name, "demo");
    assert!(descriptor.supports("snowflake"));
}

#[test]
fn test_version_record_shape_on_disk() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let root = EnginesRoot::new(tmp.path());

    let jar = engine_jar("name: demo\ndialects: [tsql]\n");
    MavenEngineInstaller::with_registry(root.clone(), "demo", "a", FakeRegistry::serving("1.2.3", jar))
        .install()
        .unwrap();

    let raw = fs::read_to_string(root.version_file("demo")).unwrap();
    assert!(raw.ends_with('\n'));
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(record["version"], "v1.2.3");
    assert!(record["date"].is_string());
}

#[test]
fn test_forced_producer_failure_preserves_prior_install_exactly() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let root = EnginesRoot::new(tmp.path());

    let jar = engine_jar("name: demo\ndialects: [tsql]\n");
    MavenEngineInstaller::with_registry(root.clone(), "demo", "a", FakeRegistry::serving("1.0.0", jar))
        .install()
        .unwrap();

    let prior: Vec<(String, Vec<u8>)> = snapshot(&root, "demo");

    // Force a failure after the producer has partially written files.
    let failed = install_with_rollback(&root, "demo", "2.0.0", |attempt| {
        fs::write(attempt.lib_dir.join("half-written.bin"), b"partial").unwrap();
        Err(Error::structural(&attempt.lib_dir, "forced failure"))
    });

    assert_eq!(failed, None);
    assert_eq!(snapshot(&root, "demo"), prior);
    assert!(!root.backup_dir("demo").exists());
}

#[test]
fn test_corrupt_version_record_reads_as_not_installed() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let root = EnginesRoot::new(tmp.path());

    let state_dir = root.state_dir("demo");
    fs::create_dir_all(&state_dir).unwrap();
    fs::write(
        state_dir.join("version.json"),
        r#"{"date": "2026-01-01T00:00:00Z"}"#,
    )
    .unwrap();

    assert_eq!(installed_version(&root, "demo"), None);
}

#[test]
fn test_unreachable_registry_leaves_root_untouched() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let root = EnginesRoot::new(tmp.path());

    let installed =
        MavenEngineInstaller::with_registry(root.clone(), "demo", "a", FakeRegistry::unreachable())
            .install();

    assert_eq!(installed, None);
    assert!(!root.engine_root("demo").exists());
    assert!(all_engine_names(&root).is_empty());
}

/// Sorted relative-path/content pairs for every file under an engine root.
fn snapshot(root: &EnginesRoot, engine: &str) -> Vec<(String, Vec<u8>)> {
    fn walk(dir: &std::path::Path, base: &std::path::Path, out: &mut Vec<(String, Vec<u8>)>) {
        for entry in fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, base, out);
            } else {
                let relative = path.strip_prefix(base).unwrap().to_string_lossy().into_owned();
                out.push((relative, fs::read(&path).unwrap()));
            }
        }
    }
    let base = root.engine_root(engine);
    let mut out = Vec::new();
    walk(&base, &base, &mut out);
    out.sort();
    out
}
