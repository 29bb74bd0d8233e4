//! Bundle configuration.
//!
//! An optional `apprun.toml` at the bundle root names the interpreter and
//! the site-packages directories to scan. Without it the interpreter is
//! detected from the usual relocatable Python layouts.

use crate::error::ConfigError;
use apprun_platform::{Interpreter, PythonVersion};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "apprun.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    pub default_entry_point: Option<String>,
    #[serde(default)]
    pub python: PythonConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PythonConfig {
    /// Interpreter path, relative paths are taken from the bundle root.
    pub interpreter:   Option<PathBuf>,
    pub version:       Option<String>,
    #[serde(default)]
    pub site_packages: Vec<PathBuf>,
}

/// The interpreter of the bundle and where its distributions live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePython {
    pub interpreter:   Interpreter,
    pub site_packages: Vec<PathBuf>,
}

impl BundleConfig {
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path`; a missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                info!(path = %path.display(), "loaded bundle configuration");
                Self::from_toml(&raw, path)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no bundle configuration");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn default_path(bundle_root: &Path) -> PathBuf {
        bundle_root.join(CONFIG_FILE_NAME)
    }

    pub fn resolve_python(&self, bundle_root: &Path) -> Result<BundlePython, ConfigError> {
        let path = match &self.python.interpreter {
            Some(path) => bundle_root.join(path),
            None => detect_interpreter(bundle_root).ok_or_else(|| ConfigError::NoInterpreter {
                bundle_root: bundle_root.to_path_buf(),
            })?,
        };

        let version = match &self.python.version {
            Some(version) => version.parse::<PythonVersion>()?,
            None => path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(PythonVersion::from_executable_name)
                .ok_or_else(|| ConfigError::UnknownVersion { path: path.clone() })?,
        };

        let interpreter = Interpreter::new(path, version);
        let site_packages = if self.python.site_packages.is_empty() {
            vec![interpreter.site_packages()]
        } else {
            self.python
                .site_packages
                .iter()
                .map(|dir| bundle_root.join(dir))
                .collect()
        };

        debug!(interpreter = %interpreter.path().display(), %version, "bundle interpreter");
        Ok(BundlePython {
            interpreter,
            site_packages,
        })
    }
}

fn versioned_interpreters(bin_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(bin_dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .and_then(PythonVersion::from_executable_name)
                .is_some()
        })
        .filter(|path| path.is_file())
        .collect();
    found.sort();
    found
}

/// Finds `opt/python3.*/bin/python3.*`, then `usr/bin/python3.*`.
pub fn detect_interpreter(bundle_root: &Path) -> Option<PathBuf> {
    let opt = bundle_root.join("opt");
    let mut prefixes: Vec<PathBuf> = std::fs::read_dir(&opt)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("python3"))
                })
                .collect()
        })
        .unwrap_or_default();
    prefixes.sort();

    prefixes
        .iter()
        .map(|prefix| prefix.join("bin"))
        .chain(std::iter::once(bundle_root.join("usr").join("bin")))
        .find_map(|bin_dir| versioned_interpreters(&bin_dir).into_iter().next())
}
