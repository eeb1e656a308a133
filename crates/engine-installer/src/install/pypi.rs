//! Python package engine installer.
//!
//! The payload is a Python package that carries its engine resources in an
//! `lsp` folder. The producer provisions an isolated virtual environment
//! inside the fresh lib directory, installs the package into it with pip,
//! copies the `lsp` resources over the lib directory, and finally runs the
//! package's install hook if it ships one.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use engine_config::DESCRIPTOR_FILENAME;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::install_latest;
use crate::atomic::InstallAttempt;
use crate::error::{Error, Result};
use crate::layout::EnginesRoot;
use crate::registry::{PypiRegistry, RegistryClient};
use crate::state;

/// Directory name of the isolated environment inside `lib`.
const VENV_DIR: &str = ".venv";

/// Folder inside the installed package holding the engine resources.
const RESOURCE_DIR: &str = "lsp";

/// Installs a Python package under a lib directory and reports where its
/// modules landed.
///
/// The one implementation shells out to `python -m venv` and pip; tests
/// inject doubles that lay out a site-packages tree directly.
pub trait PackageProvisioner {
    fn provision(&self, package: &str, lib_dir: &Path) -> Result<PathBuf>;
}

impl<P: PackageProvisioner + ?Sized> PackageProvisioner for &P {
    fn provision(&self, package: &str, lib_dir: &Path) -> Result<PathBuf> {
        (**self).provision(package, lib_dir)
    }
}

/// Default provisioner: an isolated environment plus a targeted pip install.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipProvisioner;

impl PackageProvisioner for PipProvisioner {
    fn provision(&self, package: &str, lib_dir: &Path) -> Result<PathBuf> {
        let venv = create_venv(lib_dir)?;
        let site_packages = locate_site_packages(&venv)?;
        install_package(package, lib_dir, &venv, &site_packages)?;
        Ok(site_packages)
    }
}

/// Installs an engine published as a Python package.
pub struct PypiEngineInstaller<C = PypiRegistry, P = PipProvisioner> {
    root: EnginesRoot,
    product: String,
    package: String,
    registry: C,
    provisioner: P,
}

impl PypiEngineInstaller {
    /// Installer resolving against the canonical package index.
    pub fn new(root: EnginesRoot, product: impl Into<String>, package: impl Into<String>) -> Self {
        let package = package.into();
        let registry = PypiRegistry::new(package.clone());
        Self::with_registry(root, product, package, registry)
    }
}

impl<C: RegistryClient> PypiEngineInstaller<C> {
    /// Installer with an explicit registry client. Tests inject doubles here.
    pub fn with_registry(
        root: EnginesRoot,
        product: impl Into<String>,
        package: impl Into<String>,
        registry: C,
    ) -> Self {
        Self::with_parts(root, product, package, registry, PipProvisioner)
    }
}

impl<C: RegistryClient, P: PackageProvisioner> PypiEngineInstaller<C, P> {
    /// Installer with explicit registry and provisioner. Tests drive the
    /// full install path through this without touching pip.
    pub fn with_parts(
        root: EnginesRoot,
        product: impl Into<String>,
        package: impl Into<String>,
        registry: C,
        provisioner: P,
    ) -> Self {
        Self {
            root,
            product: product.into(),
            package: package.into(),
            registry,
            provisioner,
        }
    }

    /// Install the latest published version, if newer than what is installed.
    pub fn install(&self) -> Option<PathBuf> {
        install_latest(&self.root, &self.product, &self.registry, |attempt| {
            self.produce(attempt)
        })
    }

    fn produce(&self, attempt: &InstallAttempt) -> Result<()> {
        let site_packages = self.provisioner.provision(&self.package, &attempt.lib_dir)?;
        copy_engine_resources(&site_packages, &attempt.lib_dir)?;
        let descriptor = attempt.lib_dir.join(DESCRIPTOR_FILENAME);
        if !descriptor.is_file() {
            return Err(Error::structural(
                descriptor,
                format!("installed engine is missing a '{DESCRIPTOR_FILENAME}' in its '{RESOURCE_DIR}' folder"),
            ));
        }
        run_install_script(&attempt.lib_dir)?;
        state::write_version_record(&attempt.engine_root, &attempt.version)
    }
}

/// `pip install <package> -t <site-packages>`, streamed to the terminal.
fn install_package(package: &str, lib_dir: &Path, venv: &Path, site_packages: &Path) -> Result<()> {
    let pip = pip_path(venv);
    let mut cmd = Command::new(&pip);
    cmd.arg("install")
        .arg(package)
        .arg("-t")
        .arg(site_packages)
        .current_dir(lib_dir);
    run_streaming(cmd, &format!("pip install {package}"))
}

/// Create the isolated environment at `lib/.venv` with `python -m venv`.
fn create_venv(lib_dir: &Path) -> Result<PathBuf> {
    let python = locate_python()?;
    debug!(python = %python.display(), "creating virtual environment");
    let mut cmd = Command::new(&python);
    cmd.args(["-m", "venv", VENV_DIR]).current_dir(lib_dir);
    run_streaming(cmd, "python -m venv")?;
    Ok(lib_dir.join(VENV_DIR))
}

/// Find a Python interpreter on PATH.
fn locate_python() -> Result<PathBuf> {
    let candidates: &[&str] = if cfg!(windows) {
        &["python", "python3"]
    } else {
        &["python3", "python"]
    };
    candidates
        .iter()
        .find_map(|tool| find_on_path(tool))
        .ok_or(Error::InterpreterNotFound)
}

/// `which`-style PATH search.
fn find_on_path(tool: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    let extensions: Vec<String> = if cfg!(windows) {
        std::env::var("PATHEXT")
            .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
            .split(';')
            .map(|s| s.to_ascii_lowercase())
            .collect()
    } else {
        vec![String::new()]
    };
    for dir in std::env::split_paths(&path_var) {
        for ext in &extensions {
            let candidate = if ext.is_empty() {
                dir.join(tool)
            } else {
                dir.join(format!("{tool}{ext}"))
            };
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Locate the environment's `site-packages` directory.
///
/// Windows environments place it directly at `Lib/site-packages`; elsewhere
/// it sits under `lib/python<version>/site-packages`, whose interpreter
/// folder name must be scanned for.
#[cfg(windows)]
fn locate_site_packages(venv: &Path) -> Result<PathBuf> {
    let packages = venv.join("Lib").join("site-packages");
    if packages.exists() {
        return Ok(packages);
    }
    Err(Error::structural(venv, "could not locate 'site-packages'"))
}

#[cfg(not(windows))]
fn locate_site_packages(venv: &Path) -> Result<PathBuf> {
    let lib = venv.join("lib");
    let entries = fs::read_dir(&lib).map_err(|e| Error::io(&lib, e))?;
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with("python") {
            continue;
        }
        let packages = entry.path().join("site-packages");
        if packages.exists() {
            return Ok(packages);
        }
    }
    Err(Error::structural(venv, "could not locate 'site-packages'"))
}

/// The environment's pip entry point.
fn pip_path(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("pip3.exe")
    } else {
        venv.join("bin").join("pip3")
    }
}

/// Recursively copy the package's `lsp` folder over `lib`, merging with and
/// overwriting existing files.
fn copy_engine_resources(site_packages: &Path, lib_dir: &Path) -> Result<()> {
    let resources = site_packages.join(RESOURCE_DIR);
    if !resources.exists() {
        return Err(Error::structural(
            resources,
            format!("installed engine is missing a '{RESOURCE_DIR}' folder"),
        ));
    }
    for entry in WalkDir::new(&resources) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(&resources).to_path_buf();
            Error::structural(path, "could not walk engine resources")
        })?;
        let relative = entry
            .path()
            .strip_prefix(&resources)
            .map_err(|_| Error::structural(entry.path(), "walked outside engine resources"))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = lib_dir.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
        }
    }
    Ok(())
}

/// Run the package's install hook, if present, from the lib directory.
///
/// The hook is `installer.ps1` on Windows and `installer.sh` elsewhere.
fn run_install_script(lib_dir: &Path) -> Result<()> {
    let script_name = if cfg!(windows) {
        "installer.ps1"
    } else {
        "installer.sh"
    };
    let script = lib_dir.join(script_name);
    if !script.exists() {
        return Ok(());
    }
    info!(script = %script.display(), "running engine install script");
    let mut cmd = Command::new(&script);
    cmd.current_dir(lib_dir);
    run_streaming(cmd, script_name)
}

/// Run a command with inherited stdio so progress is visible, mapping a
/// non-zero exit to [`Error::ProcessFailure`].
fn run_streaming(mut cmd: Command, label: &str) -> Result<()> {
    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| Error::ProcessSpawn {
            command: label.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(Error::ProcessFailure {
            command: label.to_string(),
            status,
        });
    }
    Ok(())
}
