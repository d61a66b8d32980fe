// hdxctl - HDX export trigger for the Raw Data API
// Licensed under the MIT License

use hdxctl::cli::{Cli, Commands};
use hdxctl::config::{load_config, LoggingConfig};
use hdxctl::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config file when it loads; errors loading it
    // are reported by the command itself
    let (file_logging, configured_level) = match load_config(&cli.config) {
        Ok(config) => (config.logging, Some(config.application.log_level)),
        Err(_) => (LoggingConfig::default(), None),
    };
    let log_level = cli
        .log_level
        .clone()
        .or(configured_level)
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &file_logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), config = %cli.config, "Starting hdxctl");

    let exit_code = run(&cli).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e:#}");
        5
    });

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

async fn run(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Extract(args) => args.execute(&cli.config).await,
        Commands::Trigger(args) => args.execute(&cli.config).await,
        Commands::List(args) => args.execute(&cli.config).await,
        Commands::Inspect(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
