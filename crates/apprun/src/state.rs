use crate::error::ConfigError;
use apprun_platform::EnvOverlay;
use apprun_shim::ResolveRequest;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub mod vars {
    pub const APPDIR: &str = "APPDIR";
    pub const APPIMAGE: &str = "APPIMAGE";
    pub const ARGV0: &str = "ARGV0";
    pub const APP_ENTRY_POINT: &str = "APP_ENTRY_POINT";
    pub const APP_DEFAULT_ENTRY_POINT: &str = "APP_DEFAULT_ENTRY_POINT";
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
    pub const PATH: &str = "PATH";
    pub const APPRUN_CONFIG: &str = "APPRUN_CONFIG";
    pub const APPRUN_LOG: &str = "APPRUN_LOG";
}

/// Snapshot of the process environment the launcher decides from.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<OsString, OsString>,
    cwd:  PathBuf,
}

impl Environment {
    pub fn capture() -> std::io::Result<Self> {
        Ok(Self {
            vars: std::env::vars_os().collect(),
            cwd:  std::env::current_dir()?,
        })
    }

    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            cwd:  cwd.into(),
        }
    }

    pub fn with(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Value of `key`, empty values count as unset.
    pub fn var_os(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .get(OsStr::new(key))
            .map(OsString::as_os_str)
            .filter(|v| !v.is_empty())
    }

    pub fn var(&self, key: &str) -> Option<String> {
        self.var_os(key)
            .map(|v| v.to_string_lossy().into_owned())
    }

    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.var_os(key).map(|v| self.cwd.join(v))
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

/// Context of one launcher invocation.
#[derive(Debug, Clone)]
pub struct LauncherState {
    pub explicit_target:   Option<String>,
    pub invoked_path:      Option<PathBuf>,
    pub invoked_name:      Option<String>,
    pub default_target:    Option<String>,
    pub isolated_env_path: Option<PathBuf>,
    pub bundle_root:       PathBuf,
    pub bundle_image:      Option<PathBuf>,
    pub search_path:       Option<OsString>,
    pub cwd:               PathBuf,
    /// Environment edits for the process that is eventually started.
    pub overlay:           EnvOverlay,
    /// Environment found by activation.
    pub active_env:        Option<PathBuf>,
}

impl LauncherState {
    pub fn from_env(env: &Environment) -> Result<Self, ConfigError> {
        let bundle_root = env.path(vars::APPDIR).ok_or(ConfigError::MissingBundleRoot)?;
        let invoked_path = env.var_os(vars::ARGV0).map(PathBuf::from);
        let invoked_name = invoked_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned());

        Ok(Self {
            explicit_target: env.var(vars::APP_ENTRY_POINT),
            invoked_path,
            invoked_name,
            default_target: env.var(vars::APP_DEFAULT_ENTRY_POINT),
            isolated_env_path: env.path(vars::VIRTUAL_ENV),
            bundle_root,
            bundle_image: env.path(vars::APPIMAGE),
            search_path: env.var_os(vars::PATH).map(OsStr::to_os_string),
            cwd: env.cwd().to_path_buf(),
            overlay: EnvOverlay::new(),
            active_env: None,
        })
    }

    /// The file an environment's `bin/python3` must resolve to.
    ///
    /// The image itself when known, `$APPDIR/AppRun` for extracted bundles.
    pub fn bundle_identity(&self) -> PathBuf {
        self.bundle_image
            .clone()
            .unwrap_or_else(|| self.bundle_root.join("AppRun"))
    }

    /// Applies the default target precedence: flag, environment, config.
    pub fn apply_default(&mut self, flag: Option<String>, configured: Option<String>) {
        if let Some(flag) = flag {
            self.default_target = Some(flag);
        } else if self.default_target.is_none() {
            self.default_target = configured;
        }
    }

    pub fn resolve_request(&self) -> ResolveRequest {
        ResolveRequest {
            explicit:     self.explicit_target.clone(),
            invoked_name: self.invoked_name.clone(),
            default:      self.default_target.clone(),
        }
    }

    /// The interpreter path a target should report as its own.
    pub fn executable_override(&self) -> Option<PathBuf> {
        self.active_env
            .as_ref()
            .map(|env| env.join("bin").join("python3"))
    }
}
