use crate::error::{Error, Result};
use apprun_platform::{Command, EnvOverlay, Interpreter};
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

/// One packaged command as registered by an installed distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    name:             String,
    qualified_target: String,
}

impl TargetDescriptor {
    pub fn new(name: impl Into<String>, qualified_target: impl Into<String>) -> Self {
        Self {
            name:             name.into(),
            qualified_target: qualified_target.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_target(&self) -> &str {
        &self.qualified_target
    }

    pub fn entry_point(&self) -> Result<EntryPoint> {
        self.qualified_target.parse()
    }

    /// Produces the callable for this command, run by `interpreter`.
    pub fn load(&self, interpreter: &Interpreter) -> Result<LoadedTarget> {
        let entry = self.entry_point()?;
        Ok(LoadedTarget {
            name: self.name.clone(),
            interpreter: interpreter.clone(),
            entry,
            executable: None,
        })
    }
}

/// A parsed `module.path:attr.path [extras]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    module: String,
    attr:   String,
}

impl EntryPoint {
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn attr(&self) -> &str {
        &self.attr
    }
}

fn is_dotted_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

impl FromStr for EntryPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidTarget {
            target: s.to_string(),
            reason,
        };

        let reference = match s.split_once('[') {
            Some((head, extras)) if extras.trim_end().ends_with(']') => head,
            Some(_) => return Err(invalid("unterminated extras")),
            None => s,
        };
        let (module, attr) = reference
            .split_once(':')
            .ok_or_else(|| invalid("missing ':' before the callable"))?;
        let (module, attr) = (module.trim(), attr.trim());

        if !is_dotted_identifier(module) {
            return Err(invalid("module is not a dotted identifier"));
        }
        if !is_dotted_identifier(attr) {
            return Err(invalid("callable is not a dotted identifier"));
        }

        Ok(Self {
            module: module.to_string(),
            attr:   attr.to_string(),
        })
    }
}

/// Renders `s` as a single-quoted Python string literal.
fn py_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// The zero-argument callable of a loaded entry point.
///
/// Calling it runs the bundle interpreter with a bootstrap program that
/// imports the module, looks up the attribute, calls it and exits with
/// its return value.
#[derive(Debug, Clone)]
pub struct LoadedTarget {
    name:        String,
    interpreter: Interpreter,
    entry:       EntryPoint,
    executable:  Option<PathBuf>,
}

impl LoadedTarget {
    /// Overrides `sys.executable` seen by the target.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bootstrap(&self) -> String {
        let mut code = String::from("import importlib, sys\n");
        let _ = writeln!(code, "sys.argv[0] = {}", py_literal(&self.name));
        if let Some(executable) = &self.executable {
            let _ = writeln!(
                code,
                "sys.executable = {}",
                py_literal(&executable.to_string_lossy())
            );
        }
        let _ = writeln!(
            code,
            "target = importlib.import_module({})",
            py_literal(&self.entry.module)
        );
        let _ = writeln!(
            code,
            "for name in {}.split('.'):",
            py_literal(&self.entry.attr)
        );
        code.push_str("    target = getattr(target, name)\n");
        code.push_str("sys.exit(target())\n");
        code
    }

    pub fn command<I, S>(&self, args: I, overlay: &EnvOverlay) -> Result<Command>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(self.interpreter.path());
        if self.interpreter.supports_safe_path() {
            cmd = cmd.arg("-P");
        }
        Ok(cmd
            .arg("-c")
            .arg(self.bootstrap())
            .args(args)
            .overlay(overlay)?)
    }

    /// Runs the target and returns its exit code.
    pub fn call<I, S>(self, args: I, overlay: &EnvOverlay) -> Result<i32>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Ok(self.command(args, overlay)?.status()?)
    }
}
