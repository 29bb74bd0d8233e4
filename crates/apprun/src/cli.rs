//! Launcher-private options and the argument splitter.
//!
//! Private options share the `--python-` prefix so they cannot collide with
//! the options of packaged commands. Everything else is forwarded untouched.

use crate::error::UsageError;
use clap::{ArgAction, ArgGroup, Parser};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const PRIVATE_PREFIX: &str = "--python-";

const HELP: &str = "--python-help";
const INTERPRETER: &str = "--python-interpreter";
const VENV: &str = "--python-venv";
const ENTRY_POINT: &str = "--python-entry-point";
const MAIN: &str = "--python-main";
const SYSTEM_SITE_PACKAGES: &str = "--system-site-packages";

#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(
    about = "Starts a packaged command, the bundled python interpreter, or creates a virtual environment pointing back at the bundle.",
    disable_help_flag = true,
    disable_version_flag = true
)]
#[command(group(
    ArgGroup::new("action")
        .args(["interpreter", "venv", "entry_point"])
        .multiple(false)
))]
pub struct PrivateArgs {
    #[arg(long = "python-help", action = ArgAction::Help, help = "Show this help message and exit.")]
    pub help: Option<bool>,

    #[arg(long = "python-interpreter", help = "Start the python interpreter.")]
    pub interpreter: bool,

    #[arg(
        long = "python-venv",
        value_name = "ENV_DIR",
        num_args = 1..,
        action = ArgAction::Set,
        help = "Create virtual environments pointing to the bundle.\nShortcut for '--python-interpreter -m venv ENV_DIR'."
    )]
    pub venv: Vec<PathBuf>,

    #[arg(
        long = "system-site-packages",
        requires = "venv",
        help = "Give the virtual environments access to the bundle's site-packages."
    )]
    pub system_site_packages: bool,

    #[arg(
        long = "python-entry-point",
        value_name = "ENTRY_POINT",
        help = "Start a packaged command by name or target (e.g. ssh-mitm)."
    )]
    pub entry_point: Option<String>,

    #[arg(long = "python-main", value_name = "ENTRY_POINT", help = "Packaged command started by default.")]
    pub main: Option<String>,
}

/// Result of splitting the process arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub private:   PrivateArgs,
    /// Non-private arguments in original order, program name first.
    pub forwarded: Vec<OsString>,
}

impl ParsedArgs {
    /// The forwarded arguments without the program name.
    pub fn target_args(&self) -> &[OsString] {
        self.forwarded.get(1..).unwrap_or_default()
    }
}

fn takes_value(flag: &str) -> bool {
    matches!(flag, ENTRY_POINT | MAIN)
}

/// Separates private tokens from forwarded ones, without validating them.
pub fn partition(args: &[OsString]) -> (Vec<OsString>, Vec<OsString>) {
    let has_venv = args
        .iter()
        .filter_map(|a| a.to_str())
        .any(|a| a == VENV || a.starts_with("--python-venv="));

    let mut private = Vec::new();
    let mut forwarded = Vec::new();
    let mut tokens = args.iter().peekable();

    while let Some(token) = tokens.next() {
        let Some(text) = token.to_str() else {
            forwarded.push(token.clone());
            continue;
        };
        let (flag, inline_value) = match text.split_once('=') {
            Some((flag, _)) if flag.starts_with("--") => (flag, true),
            _ => (text, false),
        };

        match flag {
            HELP | INTERPRETER => private.push(token.clone()),
            SYSTEM_SITE_PACKAGES if has_venv => private.push(token.clone()),
            f if takes_value(f) => {
                private.push(token.clone());
                if !inline_value
                    && let Some(value) = tokens.next_if(|next| !starts_with_dash(next))
                {
                    private.push(value.clone());
                }
            }
            VENV => {
                private.push(token.clone());
                if !inline_value {
                    while let Some(value) = tokens.next_if(|next| !starts_with_dash(next)) {
                        private.push(value.clone());
                    }
                }
            }
            _ => forwarded.push(token.clone()),
        }
    }
    (private, forwarded)
}

fn starts_with_dash(token: &OsStr) -> bool {
    token.as_encoded_bytes().first() == Some(&b'-')
}

fn program_name(program: &OsStr) -> String {
    Path::new(program)
        .file_name()
        .unwrap_or(program)
        .to_string_lossy()
        .into_owned()
}

/// Splits `argv` (program name first) and validates the private options.
pub fn split(argv: Vec<OsString>) -> Result<ParsedArgs, UsageError> {
    let mut argv = argv.into_iter();
    let program = argv.next().unwrap_or_else(|| OsString::from("apprun"));
    let rest: Vec<OsString> = argv.collect();
    let prog = program_name(&program);

    let (private_tokens, forwarded_tokens) = partition(&rest);
    let private = PrivateArgs::try_parse_from(
        std::iter::once(OsString::from(&prog)).chain(private_tokens),
    )?;

    let unknown: Vec<String> = forwarded_tokens
        .iter()
        .filter(|t| t.as_encoded_bytes().starts_with(PRIVATE_PREFIX.as_bytes()))
        .map(|t| t.to_string_lossy().into_owned())
        .collect();
    if !unknown.is_empty() {
        return Err(UsageError::Unrecognized {
            prog,
            flags: unknown,
        });
    }

    let mut forwarded = Vec::with_capacity(forwarded_tokens.len() + 1);
    forwarded.push(program);
    forwarded.extend(forwarded_tokens);
    Ok(ParsedArgs { private, forwarded })
}

/// Arguments of `python -m venv` as understood by the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "venv",
    about = "Creates virtual Python environments in one or more target directories.",
    after_help = "Once an environment has been created, you may wish to activate it, e.g. by sourcing an activate script in its bin directory."
)]
pub struct VenvArgs {
    #[arg(value_name = "ENV_DIR", required = true, num_args = 1.., help = "A directory to create the environment in.")]
    pub dirs: Vec<PathBuf>,

    #[arg(long, help = "Give the virtual environment access to the bundle's site-packages.")]
    pub system_site_packages: bool,

    #[arg(long, help = "Provides an alternative prompt prefix for this environment.")]
    pub prompt: Option<String>,

    // Accepted for compatibility; environments are always symlink based and never get pip.
    #[arg(long, hide = true)]
    pub symlinks: bool,
    #[arg(long, hide = true)]
    pub without_pip: bool,
}

/// Detects `-m venv` in interpreter arguments and parses what follows it.
///
/// Returns `None` when the arguments do not run the `venv` module.
pub fn venv_invocation(args: &[OsString]) -> Option<Result<VenvArgs, UsageError>> {
    let pos = args
        .windows(2)
        .position(|w| w[0] == "-m" && w[1] == "venv")?;
    let tail = &args[pos + 2..];
    Some(
        VenvArgs::try_parse_from(std::iter::once(OsString::from("venv")).chain(tail.iter().cloned()))
            .map_err(UsageError::from),
    )
}
