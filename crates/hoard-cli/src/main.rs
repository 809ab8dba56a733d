use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

mod cli;
mod commands;
mod config;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(commands::run_command(cli))?;
    Ok(outcome.into())
}
