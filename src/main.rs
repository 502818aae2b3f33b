use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod command;
mod completion;
mod config;
mod editor;
mod error;
mod exec;
mod input;
mod jobs;
mod shell;
mod signal_handler;
mod status;

use crate::config::{Cli, Config};
use crate::shell::Shell;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init(&cli) {
        eprintln!("smallsh: {:#}", err);
        return ExitCode::FAILURE;
    }

    let config = Config::from(&cli);
    info!(
        "starting with {:?}, completion queue holds {}",
        config,
        signal_handler::COMPLETIONS.capacity()
    );

    let mut shell = Shell::new(config);
    let mut input = input::stdin_source();
    shell.run(input.as_mut());

    debug!("shell loop finished");
    ExitCode::SUCCESS
}

fn init(cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.log_file {
        init_tracing(path)?;
    }
    if !io::stderr().is_terminal() {
        colored::control::set_override(false);
    }
    signal_handler::install_handlers()
}

fn init_tracing(path: &std::path::Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("SMALLSH_LOG").unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_writer(Arc::new(log_file))
        .init();
    Ok(())
}
