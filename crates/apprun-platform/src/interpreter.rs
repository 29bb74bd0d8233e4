use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

impl PythonVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: None,
        }
    }

    /// Parses executable names such as `python3.11`.
    pub fn from_executable_name(name: &str) -> Option<Self> {
        name.strip_prefix("python")?.parse().ok()
    }

    /// `X.Y`, the form used in `lib/pythonX.Y` and executable names.
    pub fn short(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    pub fn executable_name(&self) -> String {
        format!("python{}", self.short())
    }
}

impl FromStr for PythonVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(s.to_string());
        let mut parts = s.trim().split('.');

        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let minor = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let patch = parts
            .next()
            .map(|p| p.parse().map_err(|_| invalid()))
            .transpose()?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

/// The Python interpreter shipped inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    path:    PathBuf,
    version: PythonVersion,
}

impl Interpreter {
    pub fn new(path: impl Into<PathBuf>, version: PythonVersion) -> Self {
        Self {
            path: path.into(),
            version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> PythonVersion {
        self.version
    }

    pub fn bin_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Installation prefix, the parent of the `bin` directory.
    pub fn prefix(&self) -> &Path {
        self.bin_dir().parent().unwrap_or(Path::new(""))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.version.executable_name())
    }

    pub fn site_packages(&self) -> PathBuf {
        self.prefix()
            .join("lib")
            .join(self.version.executable_name())
            .join("site-packages")
    }

    /// Whether `-P` (safe path) is understood, available since 3.11.
    pub fn supports_safe_path(&self) -> bool {
        (self.version.major, self.version.minor) >= (3, 11)
    }

    /// Names that make the launcher behave as this interpreter.
    pub fn reserved_names(&self) -> Vec<String> {
        vec![
            "python".to_string(),
            format!("python{}", self.version.major),
            self.version.executable_name(),
        ]
    }
}
