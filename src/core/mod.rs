//! Core workflow
//!
//! # Modules
//!
//! - [`merge`] - per-export request building from the base configuration
//! - [`orchestrator`] - discovery, merge and submission for one trigger run
//! - [`poller`] - task status tracking and the results document
//! - [`inspect`] - summaries of an export's stored output
//! - [`summary`] - run reporting
//!
//! # Trigger workflow
//!
//! 1. **Discover**: look exports up by ISO3 code or id, or list a schedule
//! 2. **Merge**: overlay each export on the base request configuration
//! 3. **Submit**: post each request, backing off on throttling
//! 4. **Track** (optional): poll every task to completion
//! 5. **Report**: log the run summary and write the results document
//!
//! # Example
//!
//! ```rust,no_run
//! use hdxctl::adapters::clock::TokioSleeper;
//! use hdxctl::config::load_config;
//! use hdxctl::core::merge::ConfigMerger;
//! use hdxctl::core::orchestrator::{ExportSelection, Orchestrator};
//! use hdxctl::domain::{Iso3Code, RequestConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hdxctl.toml")?;
//! let base = RequestConfig::from_file(&config.inputs.request_config)?;
//! let merger = ConfigMerger::new(base, None);
//! let orchestrator = Orchestrator::new(&config, merger, Arc::new(TokioSleeper))?;
//!
//! let selection = ExportSelection {
//!     iso3: vec![Iso3Code::new("npl")?],
//!     ..Default::default()
//! };
//! let summary = orchestrator.run(&selection).await?;
//! let results = orchestrator.track(&summary.task_ids()).await?;
//! println!("{} of {} tasks succeeded", results.success_count(), results.len());
//! # Ok(())
//! # }
//! ```

pub mod inspect;
pub mod merge;
pub mod orchestrator;
pub mod poller;
pub mod summary;
