use anyhow::Context;
use apprun::{Environment, LaunchError};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env(apprun::state::vars::APPRUN_LOG)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .init();
}

fn try_main() -> anyhow::Result<i32> {
    let env = Environment::capture().context("failed to read the process environment")?;
    apprun::run(std::env::args_os().collect(), &env)
}

fn report(err: &anyhow::Error) -> i32 {
    let launch = err.chain().find_map(|e| e.downcast_ref::<LaunchError>());
    if let Some(LaunchError::Usage(usage)) = launch {
        return usage.report();
    }
    eprintln!("apprun: {err:#}");
    launch.map_or(1, LaunchError::exit_code)
}

fn main() {
    init_tracing();
    let code = match try_main() {
        Ok(code) => code,
        Err(err) => report(&err),
    };
    std::process::exit(code);
}
