mod cli;
mod commands;
mod output;

use anyhow::{Context, Result};
use apipub_server::config::loader::load_config;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let cfg = load_config(cli.config.as_deref())
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;
    init_logging(&cfg.logging.level);

    match &cli.command {
        Commands::Invoke(args) => commands::invoke::run(&cfg, args, format).await?,
        Commands::Render(args) => commands::render::run(&cfg, args).await?,
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
