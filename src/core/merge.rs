//! Per-export request building
//!
//! A merged request is the base request configuration with every property of
//! the export descriptor written over it, followed by local-language keyword
//! augmentation for country exports.

use crate::domain::{
    ExportDescriptor, HdxError, LanguageTable, RequestConfig, Result,
};
use serde_json::Value;

/// Builds submission payloads from the shared base configuration
#[derive(Debug, Clone)]
pub struct ConfigMerger {
    base: RequestConfig,
    languages: Option<LanguageTable>,
}

impl ConfigMerger {
    pub fn new(base: RequestConfig, languages: Option<LanguageTable>) -> Self {
        Self { base, languages }
    }

    /// The shared base configuration
    pub fn base(&self) -> &RequestConfig {
        &self.base
    }

    /// Merges the base with one descriptor
    ///
    /// # Errors
    ///
    /// Returns a serialization error if an override gives a known key a
    /// value of the wrong shape (for example `categories: "all"`)
    pub fn merge(&self, descriptor: &ExportDescriptor) -> Result<RequestConfig> {
        merge(&self.base, descriptor, self.languages.as_ref())
    }
}

/// Overlays `descriptor` on a copy of `base`
///
/// When the merged ISO3 code has an entry in `languages`, its keywords are
/// appended to the `select` list of every category. `base` is left untouched.
pub fn merge(
    base: &RequestConfig,
    descriptor: &ExportDescriptor,
    languages: Option<&LanguageTable>,
) -> Result<RequestConfig> {
    let Value::Object(mut merged) = serde_json::to_value(base)? else {
        return Err(HdxError::Serialization(
            "request configuration did not serialize to an object".to_string(),
        ));
    };

    for (key, value) in &descriptor.properties {
        merged.insert(key.clone(), value.clone());
    }

    let mut config: RequestConfig = serde_json::from_value(Value::Object(merged))
        .map_err(|e| HdxError::Serialization(format!("{}: {e}", descriptor.label())))?;

    let keywords = config
        .iso3
        .as_deref()
        .and_then(|iso3| languages?.keywords_for(iso3))
        .map(<[String]>::to_vec);

    if let Some(keywords) = keywords {
        tracing::debug!(
            iso3 = ?config.iso3,
            keywords = keywords.len(),
            "Adding local language keywords"
        );
        for group in &mut config.categories {
            for category in group.values_mut() {
                category.append_select(&keywords);
            }
        }
    }

    Ok(config)
}
