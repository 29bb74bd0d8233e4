#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Interpreter stand-in: echoes its arguments and a few variables, exits 7.
const FAKE_PYTHON: &str = r#"#!/bin/sh
for arg in "$@"; do
    echo "arg:$arg"
done
echo "PYTHONUSERBASE=$PYTHONUSERBASE"
echo "PYTHONPATH=$PYTHONPATH"
exit 7
"#;

/// An extracted bundle with a fake interpreter and one installed distribution.
pub struct Bundle {
    pub dir: TempDir,
}

impl Bundle {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let bin = root.join("opt/python3.11/bin");
        fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python3.11");
        fs::write(&python, FAKE_PYTHON).unwrap();
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();

        let app_run = root.join("AppRun");
        fs::write(&app_run, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&app_run, fs::Permissions::from_mode(0o755)).unwrap();

        let bundle = Self { dir };
        bundle.install("mytool-1.0", "[console_scripts]\nmytool = pkg.cli:main\n");
        bundle
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn python(&self) -> PathBuf {
        self.root().join("opt/python3.11/bin/python3.11")
    }

    pub fn site_packages(&self) -> PathBuf {
        self.root().join("opt/python3.11/lib/python3.11/site-packages")
    }

    pub fn app_run(&self) -> PathBuf {
        self.root().join("AppRun")
    }

    pub fn install(&self, dist: &str, entry_points: &str) {
        let meta = self.site_packages().join(format!("{dist}.dist-info"));
        fs::create_dir_all(&meta).unwrap();
        fs::write(meta.join("entry_points.txt"), entry_points).unwrap();
    }
}
