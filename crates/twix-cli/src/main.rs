mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use twix_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Anonymize(args) => commands::anonymize::handle(args, &config).await,
        cli::Commands::Inspect { file, json } => commands::inspect::handle(&file, json, &config),
    }
}
