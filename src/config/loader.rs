//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::HdxConfig;
use super::secret::secret_string;
use crate::domain::errors::HdxError;
use crate::domain::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// A missing file is not an error: defaults are used and the environment
/// still applies. `${VAR}` references in the file are expanded before
/// parsing.
///
/// The variables the scheduled job has always used take precedence:
/// `RAW_DATA_API_BASE_URL`, `RAWDATA_API_AUTH_TOKEN`, `CONFIG_JSON` and
/// `LANGUAGE_JSON`. Any other setting can be overridden with
/// `HDXCTL_<SECTION>_<KEY>`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use hdxctl::config::loader::load_config;
///
/// let config = load_config("hdxctl.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HdxConfig> {
    let path = path.as_ref();

    let mut config = if path.exists() {
        let raw = fs::read_to_string(path).map_err(|e| {
            HdxError::Configuration(format!("Cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&substitute_env_vars(&raw)?)
            .map_err(|e| HdxError::Configuration(format!("Failed to parse TOML: {e}")))?
    } else {
        tracing::debug!(
            path = %path.display(),
            "Configuration file not found, using defaults and environment"
        );
        HdxConfig::default()
    };

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| HdxError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Expands `${VAR}` references from the environment, skipping comment lines
///
/// Every unset variable is reported in one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let placeholder = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| HdxError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut missing: Vec<String> = Vec::new();

    let expanded: Vec<String> = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }
            placeholder
                .replace_all(line, |caps: &regex::Captures<'_>| {
                    let name = &caps[1];
                    std::env::var(name).unwrap_or_else(|_| {
                        if !missing.iter().any(|m| m == name) {
                            missing.push(name.to_string());
                        }
                        caps[0].to_string()
                    })
                })
                .into_owned()
        })
        .collect();

    if !missing.is_empty() {
        return Err(HdxError::Configuration(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    let mut output = expanded.join("\n");
    output.push('\n');
    Ok(output)
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env(name).and_then(|v| v.parse().ok())
}

/// Applies environment variable overrides
fn apply_env_overrides(config: &mut HdxConfig) {
    // Application overrides
    if let Some(val) = env("HDXCTL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parsed("HDXCTL_APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }

    // API overrides
    if let Some(val) = env("RAW_DATA_API_BASE_URL").or_else(|| env("HDXCTL_API_BASE_URL")) {
        config.api.base_url = val.trim_end_matches('/').to_string();
    }
    if let Some(val) = env("RAWDATA_API_AUTH_TOKEN").or_else(|| env("HDXCTL_API_ACCESS_TOKEN")) {
        config.api.access_token = Some(secret_string(val));
    }

    // Submission overrides
    if let Some(val) = env_parsed("HDXCTL_SUBMISSION_RATE_LIMIT_COOLDOWN_SECONDS") {
        config.submission.rate_limit_cooldown_seconds = val;
    }
    if let Some(val) = env_parsed("HDXCTL_SUBMISSION_MAX_COOLDOWN_CYCLES") {
        config.submission.max_cooldown_cycles = val;
    }

    // Discovery overrides
    if let Some(val) = env_parsed("HDXCTL_DISCOVERY_PAGE_SIZE") {
        config.discovery.page_size = val;
    }

    // Tracking overrides
    if let Some(val) = env_parsed("HDXCTL_TRACKING_POLL_INTERVAL_SECONDS") {
        config.tracking.poll_interval_seconds = val;
    }
    if let Some(val) = env("HDXCTL_TRACKING_RESULTS_PATH") {
        config.tracking.results_path = val;
    }

    // Input overrides
    if let Some(val) = env("CONFIG_JSON").or_else(|| env("HDXCTL_INPUTS_REQUEST_CONFIG")) {
        config.inputs.request_config = val;
    }
    if let Some(val) = env("LANGUAGE_JSON").or_else(|| env("HDXCTL_INPUTS_LANGUAGE_TABLE")) {
        config.inputs.language_table = val;
    }

    // Logging overrides
    if let Some(val) = env_parsed("HDXCTL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("HDXCTL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("HDXCTL_TEST_SUBST_VAR", "test_value");
        let input = "access_token = \"${HDXCTL_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "access_token = \"test_value\"\n");
        std::env::remove_var("HDXCTL_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("HDXCTL_TEST_MISSING_VAR");
        let input = "access_token = \"${HDXCTL_TEST_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("HDXCTL_TEST_COMMENTED_VAR");
        let input = "# token = \"${HDXCTL_TEST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[api]
base_url = "http://localhost:8000/v1"
lookup_timeout_seconds = 5

[tracking]
poll_interval_seconds = 5
results_path = "out/result.json"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.api.lookup_timeout_seconds, 5);
        assert_eq!(config.tracking.results_path, "out/result.json");
        assert_eq!(config.submission.rate_limit_cooldown_seconds, 61);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[api\nbase_url = ").unwrap();
        temp_file.flush().unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }
}
