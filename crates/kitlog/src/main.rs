//! kitlog CLI - pipe, capture and inspect size-bounded rotating log files

use anyhow::Result;
use clap::Parser;
use kitlog_core::ConfigFile;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set JSON output mode if requested
    output::set_json_mode(cli.json);

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Diagnostics go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("kitlog={0},kitlog_logs={0},kitlog_core={0}", log_level).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let result = run(cli).await;

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Dispatch the command; the value is the process exit code
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.config.as_deref().map(ConfigFile::load).transpose()?;
    let config = config.as_ref();

    match cli.command {
        Commands::Pipe(args) => pipe::execute(args, config).await.map(|_| 0),
        Commands::Exec(args) => exec::execute(args, config).await,
        Commands::Demo(args) => demo::execute(args, config).await.map(|_| 0),
        Commands::Tail(args) => tail::execute(args).await.map(|_| 0),
        Commands::List { path } => list::execute(&path).await.map(|_| 0),
    }
}
