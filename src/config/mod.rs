//! Configuration management for hdxctl.
//!
//! hdxctl reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - Environment overrides (`RAW_DATA_API_BASE_URL`, `RAWDATA_API_AUTH_TOKEN`,
//!   `CONFIG_JSON`, `LANGUAGE_JSON`, `HDXCTL_*`)
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hdxctl::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hdxctl.toml")?;
//! println!("Raw Data API: {}", config.api.base_url);
//! println!("Poll interval: {}s", config.tracking.poll_interval_seconds);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`ApiConfig`] - base URL, access token, per-call timeouts
//! - [`SubmissionConfig`] - transport retries and rate-limit cooldown
//! - [`DiscoveryConfig`] - lookup attempts and page size
//! - [`TrackingConfig`] - poll interval and results document path
//! - [`InputsConfig`] - request configuration and language table paths
//! - [`LoggingConfig`] - file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://api-prod.raw-data.hotosm.org/v1"
//! access_token = "${RAWDATA_API_AUTH_TOKEN}"
//!
//! [submission]
//! rate_limit_cooldown_seconds = 61
//!
//! [tracking]
//! poll_interval_seconds = 30
//! results_path = "result.json"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApiConfig, ApplicationConfig, DiscoveryConfig, HdxConfig, InputsConfig, LoggingConfig,
    SubmissionConfig, TrackingConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
