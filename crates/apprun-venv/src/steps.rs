//! The built-in steps of environment creation.
//!
//! Each step performs one mechanical part of the layout. Steps are ordered
//! by [`Stage`]; hooks observe the context between stages.

use crate::context::EnvContext;
use crate::error::{Error, Result};
use crate::scripts::Shell;
use apprun_fs::symlink_if_absent;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Layout,
    Config,
    Interpreter,
    Scripts,
}

pub trait EnvStep: Send + Sync {
    fn name(&self) -> &'static str;

    fn stage(&self) -> Stage;

    fn apply(&self, ctx: &mut EnvContext) -> Result<()>;
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| Error::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// `bin`, `include`, the site-packages directory and `lib64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateDirs;

impl EnvStep for CreateDirs {
    fn name(&self) -> &'static str {
        "create_dirs"
    }

    fn stage(&self) -> Stage {
        Stage::Layout
    }

    fn apply(&self, ctx: &mut EnvContext) -> Result<()> {
        create_dir(&ctx.bin_dir())?;
        create_dir(&ctx.layout.include_dir())?;
        create_dir(&ctx.site_packages())?;

        #[cfg(all(unix, not(target_os = "macos"), target_pointer_width = "64"))]
        {
            let lib64 = ctx.layout.root().join("lib64");
            if symlink_if_absent("lib", &lib64)? {
                ctx.created_links.push(lib64);
            }
        }
        Ok(())
    }
}

/// Writes `pyvenv.cfg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteConfig;

impl WriteConfig {
    pub fn render(ctx: &EnvContext) -> String {
        let mut cfg = String::new();
        let _ = writeln!(cfg, "home = {}", ctx.interpreter.bin_dir().display());
        let _ = writeln!(
            cfg,
            "include-system-site-packages = {}",
            ctx.options.system_site_packages
        );
        let _ = writeln!(cfg, "version = {}", ctx.interpreter.version());
        let _ = writeln!(cfg, "executable = {}", ctx.interpreter.path().display());
        if let Some(command) = &ctx.options.command {
            let _ = writeln!(cfg, "command = {command}");
        }
        if let Some(prompt) = &ctx.options.prompt {
            let _ = writeln!(cfg, "prompt = '{prompt}'");
        }
        cfg
    }
}

impl EnvStep for WriteConfig {
    fn name(&self) -> &'static str {
        "write_config"
    }

    fn stage(&self) -> Stage {
        Stage::Config
    }

    fn apply(&self, ctx: &mut EnvContext) -> Result<()> {
        write_file(&ctx.layout.config_path(), &Self::render(ctx))
    }
}

/// Links the interpreter into `bin`.
///
/// `bin/<interpreter file name>` points at the absolute interpreter path,
/// the remaining interpreter names point at it relatively.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetupInterpreter;

impl EnvStep for SetupInterpreter {
    fn name(&self) -> &'static str {
        "setup_interpreter"
    }

    fn stage(&self) -> Stage {
        Stage::Interpreter
    }

    fn apply(&self, ctx: &mut EnvContext) -> Result<()> {
        let bin_dir = ctx.bin_dir();
        let file_name = ctx.interpreter.file_name();

        let primary = bin_dir.join(&file_name);
        if symlink_if_absent(ctx.interpreter.path(), &primary)? {
            ctx.created_links.push(primary);
        }

        for name in ctx.interpreter.reserved_names() {
            if name == file_name {
                continue;
            }
            let link = bin_dir.join(&name);
            if symlink_if_absent(&file_name, &link)? {
                ctx.created_links.push(link);
            } else {
                debug!(link = %link.display(), "keeping existing interpreter name");
            }
        }
        Ok(())
    }
}

/// Renders one activation script per supported shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteActivation;

impl EnvStep for WriteActivation {
    fn name(&self) -> &'static str {
        "write_activation"
    }

    fn stage(&self) -> Stage {
        Stage::Scripts
    }

    fn apply(&self, ctx: &mut EnvContext) -> Result<()> {
        let env_dir = ctx.layout.root().to_string_lossy().into_owned();
        let prompt = ctx.prompt();
        for shell in Shell::ALL {
            let path = ctx.bin_dir().join(shell.script_name());
            write_file(&path, &shell.render(&env_dir, &prompt))?;
        }
        Ok(())
    }
}

/// The standard step sequence.
pub fn default_steps() -> Vec<Box<dyn EnvStep>> {
    vec![
        Box::new(CreateDirs),
        Box::new(WriteConfig),
        Box::new(SetupInterpreter),
        Box::new(WriteActivation),
    ]
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::context::EnvOptions;
    use crate::layout::EnvLayout;
    use apprun_platform::{Interpreter, PythonVersion};
    use tempfile::tempdir;

    fn context(root: &Path) -> EnvContext {
        EnvContext::new(
            EnvLayout::new(root),
            Interpreter::new("/opt/app/opt/python3.11/bin/python3.11", PythonVersion::new(3, 11)),
            EnvOptions::default(),
        )
    }

    #[test]
    fn test_config_render() {
        let ctx = EnvContext {
            options: EnvOptions::default()
                .system_site_packages(true)
                .command("/opt/app/AppRun -m venv /tmp/env"),
            ..context(Path::new("/tmp/env"))
        };
        assert_eq!(
            WriteConfig::render(&ctx),
            "home = /opt/app/opt/python3.11/bin\n\
             include-system-site-packages = true\n\
             version = 3.11\n\
             executable = /opt/app/opt/python3.11/bin/python3.11\n\
             command = /opt/app/AppRun -m venv /tmp/env\n"
        );
    }

    #[test]
    fn test_setup_interpreter_links() -> Result<()> {
        let dir = tempdir().unwrap();
        let mut ctx = context(dir.path());
        CreateDirs.apply(&mut ctx)?;
        SetupInterpreter.apply(&mut ctx)?;

        let bin = dir.path().join("bin");
        assert_eq!(
            std::fs::read_link(bin.join("python3.11")).unwrap(),
            Path::new("/opt/app/opt/python3.11/bin/python3.11")
        );
        assert_eq!(std::fs::read_link(bin.join("python3")).unwrap(), Path::new("python3.11"));
        assert_eq!(std::fs::read_link(bin.join("python")).unwrap(), Path::new("python3.11"));
        assert!(ctx.created_links.contains(&bin.join("python3")));
        Ok(())
    }

    #[test]
    fn test_setup_interpreter_keeps_existing() -> Result<()> {
        let dir = tempdir().unwrap();
        let mut ctx = context(dir.path());
        CreateDirs.apply(&mut ctx)?;
        let bin = dir.path().join("bin");
        std::os::unix::fs::symlink("/elsewhere", bin.join("python")).unwrap();

        SetupInterpreter.apply(&mut ctx)?;
        assert_eq!(std::fs::read_link(bin.join("python")).unwrap(), Path::new("/elsewhere"));
        Ok(())
    }

    #[test]
    fn test_create_dirs() -> Result<()> {
        let dir = tempdir().unwrap();
        let mut ctx = context(dir.path());
        CreateDirs.apply(&mut ctx)?;
        assert!(dir.path().join("include").is_dir());
        assert!(dir.path().join("lib/python3.11/site-packages").is_dir());
        Ok(())
    }

    #[test]
    fn test_default_steps_are_stage_ordered() {
        let stages: Vec<_> = default_steps().iter().map(|s| s.stage()).collect();
        let mut sorted = stages.clone();
        sorted.sort();
        assert_eq!(stages, sorted);
    }
}
