// hdxctl - HDX export trigger for the Raw Data API
// Licensed under the MIT License

//! # hdxctl - HDX exports on the Raw Data API
//!
//! hdxctl triggers HDX export jobs on the HOT Raw Data API, tracks them until
//! they finish and reports on what they produced.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Discovering** exports by ISO3 code, id or update frequency
//! - **Building** per-export requests from a shared base configuration,
//!   with local-language keywords for country exports
//! - **Submitting** requests with backoff and a cooldown on rate limiting
//! - **Tracking** tasks until they reach a terminal state
//! - **Inspecting** the files and run metadata an export left in storage
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Workflow (merge, orchestration, polling, inspection)
//! - [`adapters`] - Raw Data API client and the sleeper seam
//! - [`domain`] - Domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hdxctl::adapters::clock::TokioSleeper;
//! use hdxctl::config::load_config;
//! use hdxctl::core::merge::ConfigMerger;
//! use hdxctl::core::orchestrator::{ExportSelection, Orchestrator};
//! use hdxctl::domain::{LanguageTable, RequestConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("hdxctl.toml")?;
//!     let base = RequestConfig::from_file(&config.inputs.request_config)?;
//!     let languages = LanguageTable::load_optional(&config.inputs.language_table)?;
//!
//!     let orchestrator =
//!         Orchestrator::new(&config, ConfigMerger::new(base, languages), Arc::new(TokioSleeper))?;
//!
//!     let selection = ExportSelection {
//!         scheduled: Some("daily".to_string()),
//!         ..Default::default()
//!     };
//!     let summary = orchestrator.run(&selection).await?;
//!     println!("Submitted {} exports", summary.submitted.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error is
//! [`domain::HdxError`]. Failures reported by the API are kept apart in
//! [`domain::RawDataApiError`]:
//!
//! ```rust,no_run
//! use hdxctl::domain::{HdxError, RawDataApiError};
//!
//! fn describe(err: &HdxError) -> &'static str {
//!     match err {
//!         HdxError::Api(RawDataApiError::RateLimited { .. }) => "throttled",
//!         HdxError::Api(e) if e.is_transport() => "unreachable",
//!         _ => "failed",
//!     }
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
