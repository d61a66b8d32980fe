//! `hdxctl validate-config`
//!
//! Checks the TOML file, the base request configuration and the language
//! table, then prints the effective settings.

use crate::config::load_config;
use crate::domain::{LanguageTable, RequestConfig};
use clap::Args;
use std::fmt::Display;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

/// Prints the outcome of one check and keeps the value on success
fn check<T, E: Display>(what: &str, outcome: Result<T, E>) -> Option<T> {
    match outcome {
        Ok(value) => {
            println!("✅ {what}: ok");
            Some(value)
        }
        Err(e) => {
            tracing::error!(check = what, error = %e, "Validation failed");
            println!("❌ {what}: {e}");
            None
        }
    }
}

impl ValidateArgs {
    /// Returns 0 when every input is valid, 2 otherwise
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");
        println!("🔍 {config_path}");

        let Some(config) = check("configuration", load_config(config_path)) else {
            return Ok(2);
        };
        let Some(request) = check(
            &config.inputs.request_config,
            RequestConfig::from_file(&config.inputs.request_config),
        ) else {
            return Ok(2);
        };
        let Some(languages) = check(
            &config.inputs.language_table,
            LanguageTable::load_optional(&config.inputs.language_table),
        ) else {
            return Ok(2);
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  API: {}", config.api.base_url);
        println!(
            "  Access Token: {}",
            if config.api.has_access_token() {
                "set"
            } else {
                "missing"
            }
        );
        println!(
            "  Submission Retries: {} on {:?}, cooldown {}s (max {} cycles)",
            config.submission.transport_retries,
            config.submission.retry_statuses,
            config.submission.rate_limit_cooldown_seconds,
            config.submission.max_cooldown_cycles
        );
        println!("  Poll Interval: {}s", config.tracking.poll_interval_seconds);
        println!("  Results: {}", config.tracking.results_path);
        println!("  Categories: {}", request.category_count());
        println!(
            "  Language Table: {}",
            match &languages {
                Some(table) => format!("{} countries", table.len()),
                None => "none".to_string(),
            }
        );
        println!();

        if !config.api.has_access_token() {
            println!("⚠️  No access token: only dry runs, listing and inspection will work");
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_invalid_config_exit_code() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[tracking]\npoll_interval_seconds = 0\n").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_config_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let request = dir.path().join("config.json");
        std::fs::write(&request, r#"{"categories": [{"Buildings": {"select": ["name"]}}]}"#)
            .unwrap();
        let config_path = dir.path().join("hdxctl.toml");
        std::fs::write(
            &config_path,
            format!(
                "[inputs]\nrequest_config = {:?}\nlanguage_table = {:?}\n",
                request.display().to_string(),
                dir.path().join("language.json").display().to_string()
            ),
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(config_path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
