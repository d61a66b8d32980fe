//! Configuration schema types
//!
//! This module defines the configuration structure for hdxctl. Every section
//! has defaults, so an empty file (or no file) plus the API environment
//! variables is a valid setup.

use crate::config::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Main hdxctl configuration
///
/// Maps one-to-one onto the sections of `hdxctl.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HdxConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Raw Data API connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Submission retry policy
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// Export discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Task tracking settings
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Input documents
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HdxConfig {
    /// Checks every section
    ///
    /// # Errors
    ///
    /// Returns the first problem found, as a message naming the setting
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.submission.validate()?;
        self.discovery.validate()?;
        self.tracking.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// `[application]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (merge payloads but don't submit them)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Raw Data API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the version path, e.g. `https://api-prod.raw-data.hotosm.org/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `Access-Token` header
    /// Zeroized on drop, redacted in `Debug`
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// Timeout of a snapshot submission attempt
    #[serde(default = "default_submit_timeout_seconds")]
    pub submit_timeout_seconds: u64,

    /// Timeout of a single export lookup
    #[serde(default = "default_lookup_timeout_seconds")]
    pub lookup_timeout_seconds: u64,

    /// Timeout of a listing page request
    #[serde(default = "default_page_timeout_seconds")]
    pub page_timeout_seconds: u64,

    /// Timeout of a task status request
    #[serde(default = "default_status_timeout_seconds")]
    pub status_timeout_seconds: u64,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("api.base_url must start with http:// or https://".to_string());
        }

        let timeouts = [
            ("submit_timeout_seconds", self.submit_timeout_seconds),
            ("lookup_timeout_seconds", self.lookup_timeout_seconds),
            ("page_timeout_seconds", self.page_timeout_seconds),
            ("status_timeout_seconds", self.status_timeout_seconds),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(format!("api.{name} must be greater than 0"));
            }
        }

        Ok(())
    }

    /// Whether a non-blank access token is configured
    pub fn has_access_token(&self) -> bool {
        use secrecy::ExposeSecret;
        self.access_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_blank())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            submit_timeout_seconds: default_submit_timeout_seconds(),
            lookup_timeout_seconds: default_lookup_timeout_seconds(),
            page_timeout_seconds: default_page_timeout_seconds(),
            status_timeout_seconds: default_status_timeout_seconds(),
        }
    }
}

/// Snapshot submission retry policy
///
/// Two tiers: fast transport retries with exponential backoff on throttling
/// statuses, then a long cooldown followed by a fresh submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
    /// Retries after the first attempt on a retryable status
    #[serde(default = "default_transport_retries")]
    pub transport_retries: usize,

    /// Backoff factor; the n-th retry waits `factor * 2^(n-1)`
    #[serde(default = "default_backoff_factor_ms")]
    pub backoff_factor_ms: u64,

    /// Statuses that are retried
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,

    /// Wait after the transport retries are exhausted
    #[serde(default = "default_rate_limit_cooldown_seconds")]
    pub rate_limit_cooldown_seconds: u64,

    /// Upper bound on cooldown-and-restart cycles per submission
    #[serde(default = "default_max_cooldown_cycles")]
    pub max_cooldown_cycles: usize,
}

impl SubmissionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.retry_statuses.iter().any(|s| !(400..=599).contains(s)) {
            return Err(format!(
                "submission.retry_statuses must be HTTP error statuses, got {:?}",
                self.retry_statuses
            ));
        }
        if self.rate_limit_cooldown_seconds == 0 {
            return Err("submission.rate_limit_cooldown_seconds must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Delay before the given retry (1-based)
    pub fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(16) as u32;
        Duration::from_millis(self.backoff_factor_ms.saturating_mul(1u64 << shift))
    }

    /// Cooldown after a rate-limit event
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_seconds)
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            transport_retries: default_transport_retries(),
            backoff_factor_ms: default_backoff_factor_ms(),
            retry_statuses: default_retry_statuses(),
            rate_limit_cooldown_seconds: default_rate_limit_cooldown_seconds(),
            max_cooldown_cycles: default_max_cooldown_cycles(),
        }
    }
}

/// Export discovery settings
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Attempts per lookup or page
    #[serde(default = "default_discovery_attempts")]
    pub max_attempts: usize,

    /// Page size of scheduled listings
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl DiscoveryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("discovery.max_attempts must be at least 1".to_string());
        }
        if !(1..=1000).contains(&self.page_size) {
            return Err(format!(
                "discovery.page_size must be between 1 and 1000, got {}",
                self.page_size
            ));
        }
        Ok(())
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_discovery_attempts(),
            page_size: default_page_size(),
        }
    }
}

/// Task tracking settings
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Wait between status polls of an unfinished task
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Where the results document is written
    #[serde(default = "default_results_path")]
    pub results_path: String,
}

impl TrackingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.poll_interval_seconds == 0 {
            return Err("tracking.poll_interval_seconds must be greater than 0".to_string());
        }
        if self.results_path.trim().is_empty() {
            return Err("tracking.results_path cannot be empty".to_string());
        }
        Ok(())
    }

    /// Poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            results_path: default_results_path(),
        }
    }
}

/// Input documents
#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    /// Base request configuration (JSON)
    #[serde(default = "default_request_config")]
    pub request_config: String,

    /// ISO3 to keyword list table (JSON, optional)
    #[serde(default = "default_language_table")]
    pub language_table: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            request_config: default_request_config(),
            language_table: default_language_table(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api-prod.raw-data.hotosm.org/v1".to_string()
}

fn default_submit_timeout_seconds() -> u64 {
    10
}

fn default_lookup_timeout_seconds() -> u64 {
    20
}

fn default_page_timeout_seconds() -> u64 {
    10
}

fn default_status_timeout_seconds() -> u64 {
    10
}

fn default_transport_retries() -> usize {
    2
}

fn default_backoff_factor_ms() -> u64 {
    1000
}

fn default_retry_statuses() -> Vec<u16> {
    vec![429, 502]
}

fn default_rate_limit_cooldown_seconds() -> u64 {
    61
}

fn default_max_cooldown_cycles() -> usize {
    5
}

fn default_discovery_attempts() -> usize {
    3
}

fn default_page_size() -> usize {
    100
}

fn default_poll_interval_seconds() -> u64 {
    30
}

fn default_results_path() -> String {
    "result.json".to_string()
}

fn default_request_config() -> String {
    "config.json".to_string()
}

fn default_language_table() -> String {
    "language.json".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
