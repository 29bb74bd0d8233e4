#![cfg(unix)]

use apprun_fs::{atomic_symlink, resolve_link_chain};
use apprun_platform::{Interpreter, PythonVersion};
use apprun_venv::{EnvBuilder, EnvContext, EnvHook, EnvOptions, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn fake_interpreter(root: &Path) -> Interpreter {
    let bin = root.join("opt/python3.11/bin");
    fs::create_dir_all(&bin).unwrap();
    let path = bin.join("python3.11");
    fs::write(&path, "#!/bin/sh\n").unwrap();
    Interpreter::new(path, PythonVersion::new(3, 11))
}

struct Redirect {
    target: PathBuf,
    calls:  Arc<AtomicUsize>,
}

impl EnvHook for Redirect {
    fn name(&self) -> &'static str {
        "redirect"
    }

    fn post_interpreter(&self, ctx: &mut EnvContext) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        atomic_symlink(&self.target, ctx.layout.interpreter_link())?;
        Ok(())
    }
}

#[test]
fn test_full_layout() {
    let dir = TempDir::new().unwrap();
    let python = fake_interpreter(dir.path());
    let env = dir.path().join("env");

    let layout = EnvBuilder::new(python.clone(), EnvOptions::default())
        .create(&env)
        .unwrap();

    assert!(layout.is_complete());
    assert!(env.join("bin/activate.fish").is_file());
    assert!(env.join("lib/python3.11/site-packages").is_dir());
    assert_eq!(resolve_link_chain(&layout.interpreter_link()).unwrap(), python.path());

    let cfg = fs::read_to_string(layout.config_path()).unwrap();
    assert!(cfg.contains("include-system-site-packages = false\n"));
    let activate = fs::read_to_string(layout.activate_script()).unwrap();
    assert!(activate.contains(&format!("VIRTUAL_ENV='{}'", env.display())));
}

#[test]
fn test_hook_redirects_interpreter_in_each_env() {
    let dir = TempDir::new().unwrap();
    let python = fake_interpreter(dir.path());
    let bundle = dir.path().join("AppRun");
    fs::write(&bundle, "").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let builder = EnvBuilder::new(python, EnvOptions::default().system_site_packages(true)).hook(
        Redirect {
            target: bundle.clone(),
            calls:  calls.clone(),
        },
    );
    let layouts = builder
        .create_all([dir.path().join("env1"), dir.path().join("env2")])
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    for layout in layouts {
        assert!(layout.points_at(&bundle));
        let cfg = fs::read_to_string(layout.config_path()).unwrap();
        assert!(cfg.contains("include-system-site-packages = true\n"));
    }
}

#[test]
fn test_recreate_keeps_existing_links() {
    let dir = TempDir::new().unwrap();
    let python = fake_interpreter(dir.path());
    let bundle = dir.path().join("AppRun");
    fs::write(&bundle, "").unwrap();
    let env = dir.path().join("env");

    let patched = EnvBuilder::new(python.clone(), EnvOptions::default()).hook(Redirect {
        target: bundle.clone(),
        calls:  Arc::new(AtomicUsize::new(0)),
    });
    patched.create(&env).unwrap();

    let layout = EnvBuilder::new(python, EnvOptions::default())
        .create(&env)
        .unwrap();
    assert!(layout.points_at(&bundle));
}
