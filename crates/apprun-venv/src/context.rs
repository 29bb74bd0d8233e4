use crate::layout::EnvLayout;
use apprun_platform::Interpreter;
use std::path::PathBuf;

/// Knobs of a single environment creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOptions {
    pub system_site_packages: bool,
    /// Shell prompt prefix; the directory name when unset.
    pub prompt:  Option<String>,
    /// Recorded as `command` in `pyvenv.cfg`.
    pub command: Option<String>,
}

impl EnvOptions {
    pub fn system_site_packages(mut self, enabled: bool) -> Self {
        self.system_site_packages = enabled;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// State threaded through the steps and hooks of one creation.
#[derive(Debug, Clone)]
pub struct EnvContext {
    pub layout:        EnvLayout,
    pub interpreter:   Interpreter,
    pub options:       EnvOptions,
    /// Symlinks created so far, in creation order.
    pub created_links: Vec<PathBuf>,
}

impl EnvContext {
    pub fn new(layout: EnvLayout, interpreter: Interpreter, options: EnvOptions) -> Self {
        Self {
            layout,
            interpreter,
            options,
            created_links: Vec::new(),
        }
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.layout.bin_dir()
    }

    pub fn site_packages(&self) -> PathBuf {
        self.layout.site_packages(self.interpreter.version())
    }

    pub fn prompt(&self) -> String {
        self.options.prompt.clone().unwrap_or_else(|| {
            self.layout
                .root()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }
}
