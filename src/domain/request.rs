//! Snapshot request configuration
//!
//! The base request configuration is a JSON document shared by every export
//! of a run. It carries the category tree (what to extract), output formats
//! and upload settings. Known keys are typed; anything else is carried
//! through untouched so new API options need no code change.

use super::errors::HdxError;
use super::errors::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// One extraction category (for example `Buildings`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Attribute keys selected for this category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,

    /// Geometry types, filters, formats, HDX metadata
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Category {
    /// Appends keywords after the existing select list
    pub fn append_select(&mut self, keywords: &[String]) {
        self.select
            .get_or_insert_with(Vec::new)
            .extend(keywords.iter().cloned());
    }
}

/// A group of named categories, one entry of the `categories` array
pub type CategoryGroup = BTreeMap<String, Category>;

/// Request body of `POST /custom/snapshot/`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Country to extract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso3: Option<String>,

    /// Custom boundary to extract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,

    /// Dataset naming and location block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<Value>,

    /// Category tree
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub categories: Vec<CategoryGroup>,

    /// Upload results to HDX
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdx_upload: Option<bool>,

    /// Only refresh metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<bool>,

    /// Worker queue on the API side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,

    /// Use a unique id in output paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<bool>,

    /// Keys without a typed field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestConfig {
    /// Loads and validates a request configuration file
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file is missing, is not valid
    /// JSON or fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HdxError::Configuration(format!(
                "Failed to read request configuration {}: {e}",
                path.display()
            ))
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            HdxError::Configuration(format!(
                "Invalid request configuration {}: {e}",
                path.display()
            ))
        })?;
        config.validate().map_err(HdxError::Configuration)?;
        Ok(config)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (index, group) in self.categories.iter().enumerate() {
            if group.is_empty() {
                return Err(format!("categories[{index}] has no category"));
            }
            for (name, category) in group {
                if name.trim().is_empty() {
                    return Err(format!("categories[{index}] has an unnamed category"));
                }
                if let Some(select) = &category.select {
                    if select.iter().any(|key| key.trim().is_empty()) {
                        return Err(format!("category '{name}' has a blank select key"));
                    }
                }
            }
        }

        if let Some(geometry) = &self.geometry {
            if geometry.get("type").and_then(Value::as_str).is_none() {
                return Err("geometry must be a GeoJSON object with a type".to_string());
            }
        }

        if let Some(iso3) = &self.iso3 {
            if iso3.len() != 3 {
                return Err(format!("iso3 '{iso3}' is not a three letter code"));
            }
        }

        Ok(())
    }

    /// Number of categories across all groups
    pub fn category_count(&self) -> usize {
        self.categories.iter().map(BTreeMap::len).sum()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<CategoryGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CategoryGroup>>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO3 code to local-language keyword list
///
/// The keywords are attribute keys such as `name:ne` that are added to every
/// category of a country export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTable(HashMap<String, Vec<String>>);

impl LanguageTable {
    /// Creates a table from a map
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        Self(entries)
    }

    /// Loads a table from a JSON file
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HdxError::Configuration(format!(
                "Failed to read language table {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            HdxError::Configuration(format!("Invalid language table {}: {e}", path.display()))
        })
    }

    /// Loads a table if the file exists
    ///
    /// A missing file means no language augmentation for this run.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No language table found");
            return Ok(None);
        }
        Self::from_file(path).map(Some)
    }

    /// Keywords for a country, if the table has an entry
    pub fn keywords_for(&self, iso3: &str) -> Option<&[String]> {
        self.0
            .get(iso3)
            .or_else(|| self.0.get(&iso3.to_ascii_uppercase()))
            .map(Vec::as_slice)
    }

    /// Number of countries in the table
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
