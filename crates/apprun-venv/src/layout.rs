use apprun_fs::resolve_link_chain;
use apprun_platform::PythonVersion;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "pyvenv.cfg";
pub const ACTIVATE_SCRIPT: &str = "activate";
pub const INTERPRETER_LINK: &str = "python3";

/// Read-only view over the expected shape of an environment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLayout {
    root: PathBuf,
}

impl EnvLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    pub fn activate_script(&self) -> PathBuf {
        self.bin_dir().join(ACTIVATE_SCRIPT)
    }

    pub fn interpreter_link(&self) -> PathBuf {
        self.bin_dir().join(INTERPRETER_LINK)
    }

    pub fn site_packages(&self, version: PythonVersion) -> PathBuf {
        self.lib_dir()
            .join(version.executable_name())
            .join("site-packages")
    }

    /// Config file and activation script exist and `bin/python3` is a symlink.
    pub fn is_complete(&self) -> bool {
        self.config_path().is_file()
            && self.activate_script().is_file()
            && self.interpreter_link().is_symlink()
    }

    /// Whether this is a complete environment whose interpreter link ends at
    /// the same file as `bundle`.
    pub fn points_at(&self, bundle: &Path) -> bool {
        self.is_complete() && self.interpreter_resolves_to(bundle)
    }

    /// Whether `bin/python3` resolves to the same file as `bundle`, without
    /// looking at the rest of the layout.
    ///
    /// Unreadable links count as a mismatch.
    pub fn interpreter_resolves_to(&self, bundle: &Path) -> bool {
        let resolved = match resolve_link_chain(&self.interpreter_link()) {
            Ok(path) => path,
            Err(err) => {
                debug!(env = %self.root.display(), error = %err, "interpreter link unreadable");
                return false;
            }
        };
        match resolve_link_chain(bundle) {
            Ok(bundle) => resolved == bundle,
            Err(err) => {
                debug!(bundle = %bundle.display(), error = %err, "bundle path unreadable");
                false
            }
        }
    }
}
