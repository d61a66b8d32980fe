//! Logging setup and shared log macros
//!
//! Level comes from `RUST_LOG` when set, otherwise from `--log-level`.
//! Human-readable lines go to stderr; `[logging] local_enabled` adds a JSON
//! log file.
//!
//! ```no_run
//! use hdxctl::config::LoggingConfig;
//! use hdxctl::logging::init_logging;
//!
//! let _guard = init_logging("debug", &LoggingConfig::default()).expect("logging");
//! tracing::info!(iso3 = "NPL", "Looking up export");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Warn about a failed attempt that will be retried
///
/// ```no_run
/// use hdxctl::log_retry_attempt;
///
/// log_retry_attempt!(1, 3, "502 Bad Gateway");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Request failed, retrying"
        )
    };
}

/// Record an export that could not be processed during a run
#[macro_export]
macro_rules! log_export_failure {
    ($label:expr, $error:expr) => {
        tracing::error!(export = %$label, error = %$error, "Export failed")
    };
}
