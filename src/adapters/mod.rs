//! External system integrations
//!
//! - [`rawdata`] - Raw Data API client (submission, discovery, status, storage)
//! - [`clock`] - waiting between attempts, replaceable in tests
//!
//! # Example
//!
//! ```rust,no_run
//! use hdxctl::adapters::clock::TokioSleeper;
//! use hdxctl::adapters::rawdata::{RawDataClient, SubmissionClient};
//! use hdxctl::config::{ApiConfig, SubmissionConfig};
//! use hdxctl::domain::RequestConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> hdxctl::domain::Result<()> {
//! let client = RawDataClient::new(&ApiConfig::default())?;
//! let submission = SubmissionClient::new(client, SubmissionConfig::default(), Arc::new(TokioSleeper));
//! let task_id = submission.submit(&RequestConfig::default()).await?;
//! println!("{task_id}");
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod rawdata;
