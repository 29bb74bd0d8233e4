//! Search-path editing and deferred environment changes.
//!
//! Activation never touches the launcher's own environment. It records an
//! [`EnvOverlay`] which is resolved against the live environment only when
//! a child process is built.

use crate::error::{Error, Result};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

fn paths_equal(p1: &Path, p2: &Path) -> bool {
    fn normalize(p: &Path) -> String {
        p.to_string_lossy().trim_end_matches(['/', '\\']).to_string()
    }
    #[cfg(target_os = "windows")]
    {
        normalize(p1).to_lowercase() == normalize(p2).to_lowercase()
    }
    #[cfg(not(target_os = "windows"))]
    {
        normalize(p1) == normalize(p2)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathModifier {
    paths: Vec<PathBuf>,
}

impl PathModifier {
    pub fn parse(value: Option<&OsStr>) -> Self {
        let paths = value
            .map(|v| {
                env::split_paths(v)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { paths }
    }

    /// Moves `path` to the front, dropping any later duplicate.
    pub fn prepend(mut self, path: PathBuf) -> Self {
        self.paths.retain(|p| !paths_equal(p, &path));
        self.paths.insert(0, path);
        self
    }

    pub fn remove(mut self, path: &Path) -> Self {
        self.paths.retain(|p| !paths_equal(p, path));
        self
    }

    pub fn build(self) -> Result<OsString> {
        env::join_paths(&self.paths).map_err(|e| Error::JoinPaths(e.to_string()))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| paths_equal(p, path))
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvChange {
    Set(OsString, OsString),
    Remove(OsString),
}

/// Environment edits recorded now and applied to a child process later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    prepends: Vec<(OsString, PathBuf)>,
    sets:     Vec<(OsString, OsString)>,
    removes:  Vec<OsString>,
}

impl EnvOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.prepends.is_empty() && self.sets.is_empty() && self.removes.is_empty()
    }

    /// Puts `dir` at the front of the search path held in `var`.
    pub fn prepend_path(&mut self, var: impl Into<OsString>, dir: impl Into<PathBuf>) -> &mut Self {
        let var = var.into();
        self.sets.retain(|(k, _)| *k != var);
        self.removes.retain(|k| *k != var);
        self.prepends.push((var, dir.into()));
        self
    }

    pub fn set(&mut self, var: impl Into<OsString>, value: impl Into<OsString>) -> &mut Self {
        let var = var.into();
        self.prepends.retain(|(k, _)| *k != var);
        self.removes.retain(|k| *k != var);
        self.sets.retain(|(k, _)| *k != var);
        self.sets.push((var, value.into()));
        self
    }

    pub fn remove(&mut self, var: impl Into<OsString>) -> &mut Self {
        let var = var.into();
        self.prepends.retain(|(k, _)| *k != var);
        self.sets.retain(|(k, _)| *k != var);
        if !self.removes.contains(&var) {
            self.removes.push(var);
        }
        self
    }

    pub fn get(&self, var: impl AsRef<OsStr>) -> Option<&OsStr> {
        let var = var.as_ref();
        self.sets
            .iter()
            .find(|(k, _)| k == var)
            .map(|(_, v)| v.as_os_str())
    }

    /// Directories prepended to `var`, most recent first.
    pub fn prepended(&self, var: impl AsRef<OsStr>) -> Vec<&Path> {
        let var = var.as_ref();
        self.prepends
            .iter()
            .rev()
            .filter(|(k, _)| k == var)
            .map(|(_, dir)| dir.as_path())
            .collect()
    }

    /// Resolves the overlay against the live process environment.
    pub fn changes(&self) -> Result<Vec<EnvChange>> {
        self.changes_with(|var| env::var_os(var))
    }

    /// Resolves the overlay against the values returned by `current`.
    pub fn changes_with<F>(&self, current: F) -> Result<Vec<EnvChange>>
    where
        F: Fn(&OsStr) -> Option<OsString>,
    {
        let mut changes = Vec::new();
        let mut seen: Vec<&OsString> = Vec::new();

        for (var, _) in &self.prepends {
            if seen.contains(&var) {
                continue;
            }
            seen.push(var);

            let mut modifier = PathModifier::parse(current(var.as_os_str()).as_deref());
            for (_, dir) in self.prepends.iter().filter(|(k, _)| k == var) {
                modifier = modifier.prepend(dir.clone());
            }
            changes.push(EnvChange::Set(var.clone(), modifier.build()?));
        }

        changes.extend(
            self.sets
                .iter()
                .map(|(k, v)| EnvChange::Set(k.clone(), v.clone())),
        );
        changes.extend(self.removes.iter().cloned().map(EnvChange::Remove));
        Ok(changes)
    }
}
