//! Trigger command implementation
//!
//! Entry point for scheduled invocations: the selection arrives as a JSON
//! event instead of flags and tasks are never tracked.

use super::extract::{build_orchestrator, failure_exit_code, print_run_summary, run_exit_code};
use crate::config::load_config;
use crate::core::orchestrator::TriggerEvent;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the trigger command
#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// Event JSON, e.g. '{"iso3": ["NPL"], "fetch_scheduled_exports": null}'
    #[arg(long, conflicts_with = "event_file")]
    pub event: Option<String>,

    /// File holding the event JSON
    #[arg(long, value_name = "PATH")]
    pub event_file: Option<PathBuf>,
}

impl TriggerArgs {
    /// Reads the event; no event at all means the daily schedule
    pub fn read_event(&self) -> anyhow::Result<TriggerEvent> {
        let raw = match (&self.event, &self.event_file) {
            (Some(inline), _) => inline.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => "{}".to_string(),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// Execute the trigger command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting trigger command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if !config.api.has_access_token() {
            tracing::error!("Access token not configured");
            eprintln!("RAWDATA_API_AUTH_TOKEN environment variable not found");
            return Ok(2);
        }

        let selection = match self.read_event().map(TriggerEvent::into_selection) {
            Ok(Ok(selection)) => selection,
            Ok(Err(e)) => {
                eprintln!("Invalid event: {e}");
                return Ok(2);
            }
            Err(e) => {
                eprintln!("Failed to read event: {e}");
                return Ok(2);
            }
        };
        tracing::info!(selection = ?selection, "Event received");

        let orchestrator = match build_orchestrator(&config) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Failed to prepare run: {e}");
                return Ok(2);
            }
        };

        match orchestrator.run(&selection).await {
            Ok(summary) => {
                print_run_summary(&summary);
                Ok(run_exit_code(&summary))
            }
            Err(e) => {
                tracing::error!(error = %e, "Trigger failed");
                eprintln!("Trigger failed: {e}");
                Ok(failure_exit_code(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_event_means_daily() {
        let args = TriggerArgs {
            event: None,
            event_file: None,
        };
        let event = args.read_event().unwrap();
        assert_eq!(event.fetch_scheduled_exports.as_deref(), Some("daily"));
    }

    #[test]
    fn test_event_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"ids": [12], "fetch_scheduled_exports": null}"#)
            .unwrap();

        let args = TriggerArgs {
            event: None,
            event_file: Some(file.path().to_path_buf()),
        };
        let event = args.read_event().unwrap();
        assert_eq!(event.ids, Some(vec![12]));
        assert!(event.fetch_scheduled_exports.is_none());
    }

    #[test]
    fn test_invalid_event_json() {
        let args = TriggerArgs {
            event: Some("{not json".to_string()),
            event_file: None,
        };
        assert!(args.read_event().is_err());
    }
}
