//! `hdxctl init`: writes a starter `hdxctl.toml`

use clap::Args;
use std::fs;
use std::path::Path;

const MINIMAL_TEMPLATE: &str = r#"# hdxctl configuration
# The access token is read from RAWDATA_API_AUTH_TOKEN.

[application]
log_level = "info"
dry_run = false

[api]
base_url = "https://api-prod.raw-data.hotosm.org/v1"

[tracking]
results_path = "result.json"

[inputs]
request_config = "config.json"
language_table = "language.json"
"#;

const ANNOTATED_TEMPLATE: &str = r#"# hdxctl configuration
#
# Every setting is shown with its default value. Any of them can be
# overridden with HDXCTL_<SECTION>_<KEY>, e.g. HDXCTL_TRACKING_RESULTS_PATH.

# --- application settings ---
[application]
# Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
log_level = "info"

# Build and log requests without submitting them
dry_run = false

# --- raw data api ---
[api]
# Base URL including the version path (env: RAW_DATA_API_BASE_URL)
base_url = "https://api-prod.raw-data.hotosm.org/v1"

# Access token; RAWDATA_API_AUTH_TOKEN is used when this is not set
# access_token = "${RAWDATA_API_AUTH_TOKEN}"

# Per-request timeouts in seconds
submit_timeout_seconds = 10
lookup_timeout_seconds = 20
page_timeout_seconds = 10
status_timeout_seconds = 10

# --- submission retry policy ---
[submission]
# Fast retries on throttling statuses; the n-th waits backoff_factor_ms * 2^(n-1)
transport_retries = 2
backoff_factor_ms = 1000
retry_statuses = [429, 502]

# Wait before submitting again once the fast retries are used up
rate_limit_cooldown_seconds = 61

# Give up after this many cooldowns
max_cooldown_cycles = 5

# --- export discovery ---
[discovery]
# Attempts per lookup and per listing page
max_attempts = 3
page_size = 100

# --- task tracking ---
[tracking]
# Wait between polls of an unfinished task
poll_interval_seconds = 30

# Results document written after tracking
results_path = "result.json"

# --- inputs ---
[inputs]
# Base request configuration (env: CONFIG_JSON)
request_config = "config.json"

# ISO3 to keyword list table, optional (env: LANGUAGE_JSON)
language_table = "language.json"

# --- logging ---
[logging]
# JSON file logging in addition to the console
local_enabled = false
local_path = "./logs"

# Rotation (daily, hourly, never)
local_rotation = "daily"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the file
    #[arg(short, long, default_value = "hdxctl.toml")]
    pub output: String,

    /// Write every setting with its default and a comment
    #[arg(long)]
    pub annotated: bool,

    /// Replace an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    fn template(&self) -> &'static str {
        if self.annotated {
            ANNOTATED_TEMPLATE
        } else {
            MINIMAL_TEMPLATE
        }
    }

    /// Write the template; exit code 2 when the file exists, 5 on I/O failure
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let target = Path::new(&self.output);
        if target.exists() && !self.force {
            tracing::warn!(output = %self.output, "Refusing to overwrite configuration");
            println!("❌ {} already exists (pass --force to replace it)", self.output);
            return Ok(2);
        }

        if let Err(e) = fs::write(target, self.template()) {
            tracing::error!(output = %self.output, error = %e, "Cannot write configuration");
            println!("❌ Could not write {}: {e}", self.output);
            return Ok(5);
        }

        tracing::info!(output = %self.output, annotated = self.annotated, "Configuration written");
        println!("✅ Wrote {}", self.output);
        println!();
        println!("Then:");
        println!("  - set RAWDATA_API_AUTH_TOKEN in the environment or a .env file");
        println!("  - put the base request in config.json");
        println!("  - check everything with: hdxctl validate-config");
        println!("  - preview a country export: hdxctl extract --iso3 NPL --dry-run");
        Ok(0)
    }
}
