//! Domain error types
//!
//! This module defines the error hierarchy for hdxctl. Errors raised while
//! talking to the Raw Data API are kept in [`RawDataApiError`] so callers can
//! tell a throttled submission from a missing export without inspecting
//! third-party HTTP client types.

use thiserror::Error;

/// Result alias used across hdxctl
pub type Result<T> = std::result::Result<T, HdxError>;

/// Error returned by every fallible hdxctl operation
#[derive(Debug, Error)]
pub enum HdxError {
    /// Bad or missing configuration, request config or language table
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Raw Data API errors
    #[error("Raw Data API error: {0}")]
    Api(#[from] RawDataApiError),

    /// Submission gave up after every retry tier was exhausted
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON that could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

/// Raw Data API errors
///
/// The variants follow how each failure is handled: transport problems are
/// retried, rate limiting triggers a cooldown, a missing export is reported
/// as "no descriptor", everything else aborts the unit of work.
#[derive(Debug, Error)]
pub enum RawDataApiError {
    /// Failed to reach the server
    #[error("Failed to connect to Raw Data API: {0}")]
    Transport(String),

    /// Request exceeded its timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Throttling statuses persisted through every transport retry
    #[error("Rate limited after {attempts} attempts (last status {status})")]
    RateLimited { status: u16, attempts: usize },

    /// Lookup returned no export
    #[error("Export not found: {0}")]
    NotFound(String),

    /// Any non-success status that is not retried
    #[error("Unexpected HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body could not be understood
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// A page of a paginated listing failed every attempt
    #[error("Failed to fetch page at offset {skip} after {attempts} attempts")]
    PaginationFailed { skip: usize, attempts: usize },
}

impl RawDataApiError {
    /// Whether the failure happened before an HTTP response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for RawDataApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RawDataApiError::Timeout(err.to_string())
        } else if err.is_decode() {
            RawDataApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            RawDataApiError::HttpStatus {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            RawDataApiError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for HdxError {
    fn from(err: std::io::Error) -> Self {
        HdxError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HdxError {
    fn from(err: serde_json::Error) -> Self {
        HdxError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for HdxError {
    fn from(err: toml::de::Error) -> Self {
        HdxError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdx_error_display() {
        let err = HdxError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_api_error_conversion() {
        let api_err = RawDataApiError::NotFound("iso3=NPL".to_string());
        let err: HdxError = api_err.into();
        assert!(matches!(err, HdxError::Api(RawDataApiError::NotFound(_))));
    }

    #[test]
    fn test_rate_limited_display() {
        let err = RawDataApiError::RateLimited {
            status: 429,
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "Rate limited after 3 attempts (last status 429)"
        );
    }

    #[test]
    fn test_is_transport() {
        assert!(RawDataApiError::Transport("refused".into()).is_transport());
        assert!(RawDataApiError::Timeout("10s".into()).is_transport());
        assert!(!RawDataApiError::NotFound("id=1".into()).is_transport());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: HdxError = io_err.into();
        assert!(matches!(err, HdxError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: HdxError = json_err.into();
        assert!(matches!(err, HdxError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: HdxError = toml_err.into();
        assert!(err.to_string().contains("TOML parse error"));
    }
}
