use crate::env::{EnvChange, EnvOverlay};
use crate::error::{Error, Result};
use std::convert::Infallible;
use std::ffi::OsStr;
use std::process::Command as StdCommand;
use tracing::debug;

#[derive(Debug)]
pub struct Command {
    inner:   StdCommand,
    program: String,
}

impl Command {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        let program = program.as_ref();
        Self {
            inner:   StdCommand::new(program),
            program: program.to_string_lossy().into_owned(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.inner.env(key, val);
        self
    }

    pub fn env_remove(mut self, key: impl AsRef<OsStr>) -> Self {
        self.inner.env_remove(key);
        self
    }

    /// Applies `overlay` on top of the inherited environment.
    pub fn overlay(mut self, overlay: &EnvOverlay) -> Result<Self> {
        for change in overlay.changes()? {
            self = match change {
                EnvChange::Set(key, value) => self.env(key, value),
                EnvChange::Remove(key) => self.env_remove(key),
            };
        }
        Ok(self)
    }

    pub fn get_args(&self) -> Vec<&OsStr> {
        self.inner.get_args().collect()
    }

    pub fn get_env(&self, key: impl AsRef<OsStr>) -> Option<Option<&OsStr>> {
        let key = key.as_ref();
        self.inner
            .get_envs()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Runs to completion and returns the exit code.
    ///
    /// A child killed by a signal reports `128 + signal`, as shells do.
    pub fn status(mut self) -> Result<i32> {
        debug!(program = %self.program, "spawning");
        let status = self.inner.status().map_err(|e| Error::CommandFailed {
            cmd:    self.program.clone(),
            source: e,
        })?;

        if let Some(code) = status.code() {
            return Ok(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Ok(128 + signal);
            }
        }
        Ok(1)
    }

    /// Replaces the current process image.
    ///
    /// Never returns on success: the launcher ceases to exist and the new
    /// program inherits its pid. Only the failure to replace is reported.
    pub fn exec(mut self) -> Result<Infallible> {
        debug!(program = %self.program, "replacing process image");

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            let err = self.inner.exec();
            Err(Error::CommandFailed {
                cmd:    self.program,
                source: err,
            })
        }

        #[cfg(not(unix))]
        {
            let status = self.inner.status().map_err(|e| Error::CommandFailed {
                cmd:    self.program.clone(),
                source: e,
            })?;
            std::process::exit(status.code().unwrap_or(1))
        }
    }
}
