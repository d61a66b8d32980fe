//! Extract command implementation
//!
//! This module implements the `extract` command: trigger exports selected by
//! ISO3 code, id or schedule, and optionally track them to completion.

use crate::adapters::clock::TokioSleeper;
use crate::config::{load_config, HdxConfig};
use crate::core::merge::ConfigMerger;
use crate::core::orchestrator::{ExportSelection, Orchestrator, DEFAULT_FREQUENCY};
use crate::core::summary::RunSummary;
use crate::domain::{ExportId, HdxError, Iso3Code, LanguageTable, RequestConfig, TaskResults};
use clap::{ArgGroup, Args};
use std::sync::Arc;

/// Arguments for the extract command
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .args(["iso3", "ids", "fetch_scheduled_exports"])
))]
pub struct ExtractArgs {
    /// Country ISO3 codes, space separated
    #[arg(long, num_args = 1.., value_name = "ISO3")]
    pub iso3: Vec<Iso3Code>,

    /// Export ids, space separated
    #[arg(long, num_args = 1.., value_name = "ID")]
    pub ids: Vec<ExportId>,

    /// Trigger every export with this update frequency (default: daily)
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = DEFAULT_FREQUENCY,
        value_name = "FREQUENCY"
    )]
    pub fetch_scheduled_exports: Option<String>,

    /// Wait for every task to finish and write the results document
    #[arg(long)]
    pub track: bool,

    /// Build the requests and log them without submitting
    #[arg(long)]
    pub dry_run: bool,
}

impl ExtractArgs {
    /// Selected exports
    pub fn selection(&self) -> ExportSelection {
        ExportSelection {
            iso3: self.iso3.clone(),
            ids: self.ids.clone(),
            scheduled: self.fetch_scheduled_exports.clone(),
        }
    }

    /// Execute the extract command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting extract command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if !config.application.dry_run && !config.api.has_access_token() {
            eprintln!("RAWDATA_API_AUTH_TOKEN is not set and api.access_token is empty");
            return Ok(2);
        }

        let orchestrator = match build_orchestrator(&config) {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Failed to prepare run");
                eprintln!("Failed to prepare run: {e}");
                return Ok(2);
            }
        };

        if orchestrator.is_dry_run() {
            println!("🔍 DRY RUN MODE - requests are logged, not submitted");
            println!();
        }

        let summary = match orchestrator.run(&self.selection()).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Extract failed");
                eprintln!("Extract failed: {e}");
                return Ok(failure_exit_code(&e));
            }
        };

        print_run_summary(&summary);

        if self.track && !orchestrator.is_dry_run() {
            let results = match orchestrator.track(&summary.task_ids()).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!(error = %e, "Tracking failed");
                    eprintln!("Failed to write task results: {e}");
                    return Ok(5); // Fatal error exit code
                }
            };
            print_task_results(&results, &config.tracking.results_path);
        }

        Ok(run_exit_code(&summary))
    }
}

/// Loads the request inputs and wires the orchestrator
pub(crate) fn build_orchestrator(config: &HdxConfig) -> crate::domain::Result<Orchestrator> {
    let base = RequestConfig::from_file(&config.inputs.request_config)?;
    let languages = LanguageTable::load_optional(&config.inputs.language_table)?;
    tracing::debug!(
        request_config = %config.inputs.request_config,
        categories = base.category_count(),
        languages = languages.as_ref().map_or(0, LanguageTable::len),
        "Request inputs loaded"
    );

    let merger = ConfigMerger::new(base, languages);
    Orchestrator::new(config, merger, Arc::new(TokioSleeper))
}

/// Exit code of a run that aborted
pub(crate) fn failure_exit_code(error: &HdxError) -> i32 {
    match error {
        HdxError::Configuration(_) => 2,
        HdxError::Api(_) => 4, // Connection error exit code
        _ => 5,
    }
}

/// Exit code of a completed run
pub(crate) fn run_exit_code(summary: &RunSummary) -> i32 {
    if summary.is_successful() {
        0
    } else if summary.submitted.is_empty() && summary.has_connection_errors() {
        4
    } else {
        1 // Partial success
    }
}

pub(crate) fn print_run_summary(summary: &RunSummary) {
    println!();
    println!("📊 Run Summary:");
    println!("  Exports Found: {}", summary.exports_found);
    println!("  Lookups Missed: {}", summary.lookups_missed);
    println!("  Submitted: {}", summary.submitted.len());
    if summary.dry_run_payloads > 0 {
        println!("  Dry Run Payloads: {}", summary.dry_run_payloads);
    }
    println!("  Failed: {}", summary.errors.len());
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    for submitted in &summary.submitted {
        println!("  {} -> {}", submitted.export, submitted.task_id);
    }

    if !summary.errors.is_empty() {
        println!();
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            println!("    Export: {}", error.export);
        }
    }
    println!();

    if summary.is_successful() {
        println!("✅ All requests sent");
    } else {
        println!("⚠️  Run completed with failures");
    }
}

fn print_task_results(results: &TaskResults, path: &str) {
    println!();
    println!("📋 Task Results:");
    for (task_id, outcome) in results.iter() {
        println!("  {task_id}: {}", outcome.status());
    }
    println!(
        "  {} of {} tasks succeeded, results written to {path}",
        results.success_count(),
        results.len()
    );
}
