//! `rosgate` binary entry point.

mod cli;
mod commands;
mod config;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rosgate_core::{AutomationEngine, Gateway};

use crate::cli::{Cli, Commands};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = config::load_config(cli.global.config.as_deref())?;
    let directory = Arc::new(config.directory());
    let engine = AutomationEngine::new(config.engine_config());
    let gateway = Gateway::with_engine(directory, engine)?;

    match &cli.command {
        Commands::Call(args) => commands::call::run(&gateway, args).await,
        Commands::Renew(args) => commands::renew::run(&gateway, args).await,
        Commands::Failover(args) => commands::failover::run(&gateway, args).await,
    }
}
