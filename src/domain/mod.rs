//! Domain models and types for hdxctl.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`TaskId`], [`Iso3Code`], [`ExportId`])
//! - **Export descriptors** ([`ExportDescriptor`]) as listed by the Raw Data API
//! - **Request configuration** ([`RequestConfig`], [`LanguageTable`])
//! - **Task states and results** ([`TaskStatus`], [`TaskOutcome`], [`TaskResults`])
//! - **Error types** ([`HdxError`], [`RawDataApiError`]) and the [`Result`] alias
//!
//! ```rust
//! use hdxctl::domain::{Iso3Code, TaskStatus};
//!
//! let code = Iso3Code::new("npl").unwrap();
//! assert_eq!(code.as_str(), "NPL");
//! assert!(TaskStatus::parse("SUCCESS").is_terminal());
//! ```

pub mod descriptor;
pub mod errors;
pub mod ids;
pub mod request;
pub mod task;

pub use descriptor::{DatasetInfo, ExportDescriptor};
pub use errors::{HdxError, RawDataApiError, Result};
pub use ids::{ExportId, Iso3Code, TaskId};
pub use request::{Category, CategoryGroup, LanguageTable, RequestConfig};
pub use task::{TaskOutcome, TaskResults, TaskStatus};
