//! Command-line surface of hdxctl
//!
//! This module provides the command-line interface for hdxctl using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// hdxctl - trigger and track HDX exports on the Raw Data API
#[derive(Parser, Debug)]
#[command(name = "hdxctl")]
#[command(version, about, long_about = None)]
#[command(author = "HDX Exports Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hdxctl.toml", env = "HDXCTL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HDXCTL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trigger exports by ISO3 code, id or schedule
    Extract(commands::extract::ExtractArgs),

    /// Trigger exports from a JSON event (scheduled invocation)
    Trigger(commands::trigger::TriggerArgs),

    /// List exports known to the API
    List(commands::list::ListArgs),

    /// Show stored files and last run of an export
    Inspect(commands::inspect::InspectArgs),

    /// Validate configuration file and request inputs
    ValidateConfig(commands::validate::ValidateArgs),

    /// Write a starter hdxctl.toml
    Init(commands::init::InitArgs),
}
