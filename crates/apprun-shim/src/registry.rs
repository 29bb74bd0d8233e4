//! Installed command lookup.
//!
//! The [`Registry`] trait is the seam between resolution policy and the
//! package metadata on disk. [`EntryPointRegistry`] reads the
//! `entry_points.txt` files of every installed distribution, tests inject a
//! [`StaticRegistry`].

use crate::descriptor::TargetDescriptor;
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONSOLE_SCRIPTS: &str = "console_scripts";

pub trait Registry {
    /// Every installed command as `(name, qualified target)`.
    fn list_all(&self) -> Vec<(String, String)>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: Vec<(String, String)>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.push((name.into(), target.into()));
        self
    }
}

impl<N: Into<String>, T: Into<String>> FromIterator<(N, T)> for StaticRegistry {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, t)| (n.into(), t.into()))
                .collect(),
        }
    }
}

impl Registry for StaticRegistry {
    fn list_all(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }
}

/// Reads console scripts from `*.dist-info` / `*.egg-info` metadata.
#[derive(Debug, Clone)]
pub struct EntryPointRegistry {
    site_dirs: Vec<PathBuf>,
}

impl EntryPointRegistry {
    pub fn new(site_dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            site_dirs: site_dirs.into_iter().collect(),
        }
    }

    fn metadata_dirs(site_dir: &Path) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(site_dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %site_dir.display(), error = %err, "skipping site directory");
                return Vec::new();
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == "dist-info" || ext == "egg-info")
            })
            .collect();
        dirs.sort();
        dirs
    }
}

impl Registry for EntryPointRegistry {
    fn list_all(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        for site_dir in &self.site_dirs {
            for meta_dir in Self::metadata_dirs(site_dir) {
                let path = meta_dir.join("entry_points.txt");
                match std::fs::read_to_string(&path) {
                    Ok(raw) => entries.extend(parse_entry_points(&raw, CONSOLE_SCRIPTS)),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "unreadable entry point metadata")
                    }
                }
            }
        }
        entries
    }
}

/// Extracts `name = target` pairs of `group` from an `entry_points.txt`.
pub fn parse_entry_points(raw: &str, group: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut in_group = false;

    for line in raw.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_group = section.trim() == group;
            continue;
        }
        if !in_group {
            continue;
        }
        if let Some((name, target)) = line.split_once('=') {
            let (name, target) = (name.trim(), target.trim());
            if !name.is_empty() && !target.is_empty() {
                entries.push((name.to_string(), target.to_string()));
            }
        }
    }
    entries
}

/// Lookup table keyed by both short name and qualified target.
#[derive(Debug, Clone, Default)]
pub struct RegistryIndex {
    entries: Vec<(String, String)>,
    keys:    HashMap<String, usize>,
}

impl RegistryIndex {
    pub fn build<R: Registry + ?Sized>(registry: &R) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut keys = HashMap::new();

        for (name, target) in registry.list_all() {
            if keys.contains_key(&name) {
                debug!(%name, %target, "shadowed command");
                continue;
            }
            keys.insert(name.clone(), entries.len());
            entries.push((name, target));
        }
        for (idx, (_, target)) in entries.iter().enumerate() {
            keys.entry(target.clone()).or_insert(idx);
        }

        Self { entries, keys }
    }

    pub fn lookup(&self, key: &str) -> Option<TargetDescriptor> {
        self.keys.get(key).map(|&idx| {
            let (name, target) = &self.entries[idx];
            TargetDescriptor::new(name.clone(), target.clone())
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Registered command names, in registry order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

/// Builds the index on first use and keeps it for the rest of the run.
pub struct CachedRegistry {
    registry: Box<dyn Registry>,
    index:    OnceCell<RegistryIndex>,
}

impl CachedRegistry {
    pub fn new(registry: impl Registry + 'static) -> Self {
        Self {
            registry: Box::new(registry),
            index:    OnceCell::new(),
        }
    }

    pub fn index(&self) -> &RegistryIndex {
        self.index
            .get_or_init(|| RegistryIndex::build(self.registry.as_ref()))
    }
}

impl std::fmt::Debug for CachedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRegistry")
            .field("index", &self.index.get())
            .finish()
    }
}
