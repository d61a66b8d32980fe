//! Export inspection
//!
//! Summarizes what an export left in storage: the files under its folder and
//! the `meta.json` written by its last run.

use crate::adapters::rawdata::{RawDataClient, StoredObject};
use crate::domain::{ExportDescriptor, HdxError, RawDataApiError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;

/// Name of the run metadata document inside an export folder
pub const META_FILE: &str = "meta.json";

/// Files stored under one export folder
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSummary {
    pub folder: String,
    pub file_count: usize,
    pub total_size: u64,
    pub latest_modified: Option<DateTime<Utc>>,
}

impl StorageSummary {
    /// Totals over the objects whose key lies under `folder`
    pub fn from_objects(folder: &str, objects: &[StoredObject]) -> Self {
        let in_folder: Vec<&StoredObject> =
            objects.iter().filter(|o| o.key.starts_with(folder)).collect();
        Self {
            folder: folder.to_string(),
            file_count: in_folder.len(),
            total_size: in_folder.iter().map(|o| o.size).sum(),
            latest_modified: in_folder.iter().filter_map(|o| o.last_modified).max(),
        }
    }
}

/// HDX upload results of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadCounts {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl UploadCounts {
    fn count(&mut self, status: Option<&str>) {
        match status.map(str::to_ascii_uppercase).as_deref() {
            Some("SUCCESS") => self.success += 1,
            Some("FAILED") => self.failed += 1,
            _ => self.skipped += 1,
        }
    }
}

/// One dataset produced by a run
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub category: String,
    pub name: Option<String>,
    pub resources: usize,
    pub total_size: u64,
    pub formats: BTreeSet<String>,
    pub hdx_url: Option<String>,
}

/// Summary of a run's `meta.json`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunMetaSummary {
    pub started_at: Option<String>,
    pub elapsed_time: Option<String>,
    pub dataset_count: usize,
    pub uploads: UploadCounts,
    pub datasets: Vec<DatasetSummary>,
}

impl RunMetaSummary {
    /// Summarizes a `meta.json` document
    ///
    /// `datasets` is a list of single-entry objects mapping a category name
    /// to its dataset; a dataset without `hdx_upload` counts as skipped.
    pub fn from_meta(meta: &Value) -> Self {
        let entries = meta
            .get("datasets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut uploads = UploadCounts::default();
        let mut datasets = Vec::new();

        for entry in entries.iter().filter_map(Value::as_object) {
            for (category, dataset) in entry {
                uploads.count(dataset.get("hdx_upload").and_then(Value::as_str));

                let resources = dataset
                    .get("resources")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();

                datasets.push(DatasetSummary {
                    category: category.clone(),
                    name: text(dataset.get("name")),
                    resources: resources.len(),
                    total_size: resources
                        .iter()
                        .filter_map(|r| r.get("size").and_then(Value::as_u64))
                        .sum(),
                    formats: resources
                        .iter()
                        .filter_map(|r| r.get("format").and_then(Value::as_str))
                        .filter(|f| !f.is_empty())
                        .map(str::to_string)
                        .collect(),
                    hdx_url: text(dataset.get("hdx_url")),
                });
            }
        }

        Self {
            started_at: text(meta.get("started_at")),
            elapsed_time: text(meta.get("elapsed_time")),
            dataset_count: entries.len(),
            uploads,
            datasets,
        }
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Everything known about one export's stored output
#[derive(Debug, Clone, PartialEq)]
pub struct ExportInspection {
    pub export: String,
    pub storage: StorageSummary,
    pub last_run: Option<RunMetaSummary>,
}

/// Inspects the stored output of an export
///
/// # Errors
///
/// Returns a validation error if the descriptor has no storage folder, or
/// the API error of a failed storage request. A missing `meta.json` is not
/// an error.
pub async fn inspect(client: &RawDataClient, descriptor: &ExportDescriptor) -> Result<ExportInspection> {
    let folder = descriptor.storage_folder().ok_or_else(|| {
        HdxError::Validation(format!(
            "export {} has no dataset folder to inspect",
            descriptor.label()
        ))
    })?;

    let objects = client.list_files(&folder).await?;
    let storage = StorageSummary::from_objects(&folder, &objects);
    tracing::debug!(folder = %folder, files = storage.file_count, "Storage listed");

    let meta_key = format!("{folder}{META_FILE}");
    let last_run = match client.get_object(&meta_key).await {
        Ok(meta) => Some(RunMetaSummary::from_meta(&meta)),
        Err(RawDataApiError::NotFound(_)) => {
            tracing::info!(key = %meta_key, "No run metadata stored");
            None
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ExportInspection {
        export: descriptor.label(),
        storage,
        last_run,
    })
}

/// Decimal size with a unit, e.g. `1 Byte`, `532 Bytes`, `4.2 MB`
pub fn humanize_size(bytes: u64) -> String {
    const UNITS: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

    match bytes {
        1 => return "1 Byte".to_string(),
        b if b < 1000 => return format!("{b} Bytes"),
        _ => {}
    }

    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
