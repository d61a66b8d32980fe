//! Raw Data API adapter
//!
//! - [`client`] - shared HTTP session, URL building and auth header
//! - [`submission`] - `POST /custom/snapshot/` with backoff and cooldown
//! - [`discovery`] - export lookups and paginated listings on `/cron/`
//! - [`status`] - `GET /tasks/status/{id}/`
//! - [`storage`] - stored export files and run metadata

pub mod client;
pub mod discovery;
pub mod status;
pub mod storage;
pub mod submission;

pub use client::{RawDataClient, ACCESS_TOKEN_HEADER};
pub use discovery::DiscoveryClient;
pub use status::StatusReport;
pub use storage::StoredObject;
pub use submission::SubmissionClient;
