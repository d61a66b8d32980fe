//! Export descriptors
//!
//! An export descriptor is the record the Raw Data API keeps for one
//! schedulable HDX export: either a country export keyed by ISO3 code or a
//! custom-boundary export carrying its own geometry. Descriptors are built
//! from the GeoJSON-like features returned by the `/cron/` endpoints.

use super::errors::RawDataApiError;
use super::ids::{ExportId, Iso3Code};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Dataset block of an export's properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Human readable title on HDX
    #[serde(default)]
    pub dataset_title: Option<String>,

    /// Prefix used for dataset names and storage paths
    #[serde(default)]
    pub dataset_prefix: Option<String>,

    /// Top-level storage folder
    #[serde(default)]
    pub dataset_folder: Option<String>,

    /// Locations the dataset is tagged with
    #[serde(default)]
    pub dataset_locations: Vec<String>,

    /// Schedule tag (daily, weekly, ...)
    #[serde(default)]
    pub update_frequency: Option<String>,
}

/// One exportable unit as listed by the Raw Data API
///
/// `properties` is kept as an open map: every key in it overrides the base
/// request configuration during a merge, including keys this crate does not
/// know about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDescriptor {
    /// Numeric id of the export record (removed from `properties`)
    pub id: Option<ExportId>,

    /// Feature-level ISO3 code; present only for country exports
    pub iso3: Option<Iso3Code>,

    /// Feature-level geometry; present only for custom-boundary exports
    pub geometry: Option<Value>,

    /// Override properties
    pub properties: Map<String, Value>,
}

impl ExportDescriptor {
    /// Builds a descriptor from a raw `/cron/` feature
    ///
    /// Normalization rules:
    /// - `properties.id` and `properties.cid` are removed (`id` is kept on
    ///   the descriptor itself)
    /// - `properties.dataset.dataset_locations` becomes an ordered list
    /// - a null `properties.categories` is dropped
    /// - without a `geometry.type` the geometry is dropped, otherwise the
    ///   feature-level `iso3` is dropped
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` if the feature is not an object or has no
    /// `properties` object.
    pub fn from_feature(feature: Value) -> Result<Self, RawDataApiError> {
        let Value::Object(mut feature) = feature else {
            return Err(RawDataApiError::InvalidResponse(
                "export feature is not a JSON object".to_string(),
            ));
        };

        let mut properties = match feature.remove("properties") {
            Some(Value::Object(map)) => map,
            _ => {
                return Err(RawDataApiError::InvalidResponse(
                    "export feature has no properties object".to_string(),
                ))
            }
        };

        let id = properties
            .remove("id")
            .or_else(|| feature.get("id").cloned())
            .and_then(|v| v.as_u64())
            .map(ExportId::new);
        properties.remove("cid");

        if let Some(Value::Object(dataset)) = properties.get_mut("dataset") {
            if let Some(locations) = dataset.get_mut("dataset_locations") {
                *locations = Value::Array(ordered_locations(locations.take()));
            }
        }

        if properties.get("categories").is_some_and(Value::is_null) {
            properties.remove("categories");
        }

        let has_geometry_type = feature
            .get("geometry")
            .and_then(|g| g.get("type"))
            .is_some_and(|t| !t.is_null());

        let (iso3, geometry) = if has_geometry_type {
            feature.remove("iso3");
            (None, feature.remove("geometry"))
        } else {
            feature.remove("geometry");
            let iso3 = feature
                .remove("iso3")
                .and_then(|v| v.as_str().and_then(|s| Iso3Code::new(s).ok()));
            (iso3, None)
        };

        Ok(Self {
            id,
            iso3,
            geometry,
            properties,
        })
    }

    /// Builds a descriptor carrying only override properties
    pub fn from_properties(properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            iso3: None,
            geometry: None,
            properties,
        }
    }

    /// ISO3 code from the properties, falling back to the feature-level one
    pub fn iso3_code(&self) -> Option<String> {
        self.properties
            .get("iso3")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.iso3.as_ref().map(|c| c.as_str().to_string()))
    }

    /// Parsed dataset block, if present and well formed
    pub fn dataset(&self) -> Option<DatasetInfo> {
        self.properties
            .get("dataset")
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Schedule tag of the export
    pub fn update_frequency(&self) -> Option<String> {
        self.dataset().and_then(|d| d.update_frequency)
    }

    /// Whether the export uploads to HDX
    pub fn hdx_upload(&self) -> bool {
        self.properties
            .get("hdx_upload")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Short label for logs and listings
    pub fn label(&self) -> String {
        let title = self
            .dataset()
            .and_then(|d| d.dataset_title.or(d.dataset_prefix))
            .unwrap_or_else(|| "untitled".to_string());
        match (&self.id, self.iso3_code()) {
            (Some(id), Some(iso3)) => format!("{id} [{iso3}] {title}"),
            (Some(id), None) => format!("{id} {title}"),
            (None, Some(iso3)) => format!("[{iso3}] {title}"),
            (None, None) => title,
        }
    }

    /// Storage folder holding the export's files
    ///
    /// Country exports live under `{dataset_folder}/{iso3}/`, custom exports
    /// under `{dataset_folder}/{dataset_prefix}/`.
    pub fn storage_folder(&self) -> Option<String> {
        let dataset = self.dataset()?;
        let folder = dataset.dataset_folder?;
        match self.iso3_code() {
            Some(iso3) => Some(format!("{folder}/{iso3}/")),
            None => dataset.dataset_prefix.map(|p| format!("{folder}/{p}/")),
        }
    }
}

fn ordered_locations(raw: Value) -> Vec<Value> {
    match raw {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::Object(map) => map.into_iter().map(|(k, _)| Value::String(k)).collect(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn country_feature() -> Value {
        json!({
            "type": "Feature",
            "iso3": "npl",
            "geometry": {"type": null},
            "properties": {
                "id": 7,
                "cid": 154,
                "iso3": "NPL",
                "hdx_upload": true,
                "categories": null,
                "dataset": {
                    "dataset_title": "Nepal",
                    "dataset_prefix": "hotosm_npl",
                    "dataset_folder": "HDX",
                    "dataset_locations": ["npl"],
                    "update_frequency": "daily"
                }
            }
        })
    }

    fn custom_feature() -> Value {
        json!({
            "type": "Feature",
            "iso3": null,
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]},
            "properties": {
                "id": 9,
                "cid": null,
                "iso3": null,
                "dataset": {
                    "dataset_prefix": "hotosm_kathmandu",
                    "dataset_folder": "HDX",
                    "dataset_locations": "npl"
                }
            }
        })
    }

    #[test]
    fn test_country_feature_drops_internal_fields() {
        let descriptor = ExportDescriptor::from_feature(country_feature()).unwrap();

        assert_eq!(descriptor.id, Some(ExportId::new(7)));
        assert!(!descriptor.properties.contains_key("id"));
        assert!(!descriptor.properties.contains_key("cid"));
        assert!(!descriptor.properties.contains_key("categories"));
    }

    #[test]
    fn test_country_feature_keeps_iso3_drops_geometry() {
        let descriptor = ExportDescriptor::from_feature(country_feature()).unwrap();

        assert_eq!(descriptor.iso3.as_ref().map(Iso3Code::as_str), Some("NPL"));
        assert!(descriptor.geometry.is_none());
    }

    #[test]
    fn test_custom_feature_keeps_geometry_drops_iso3() {
        let descriptor = ExportDescriptor::from_feature(custom_feature()).unwrap();

        assert!(descriptor.iso3.is_none());
        assert_eq!(descriptor.geometry.as_ref().unwrap()["type"], "Polygon");
        assert_eq!(descriptor.iso3_code(), None);
    }

    #[test]
    fn test_locations_coerced_to_list() {
        let descriptor = ExportDescriptor::from_feature(custom_feature()).unwrap();
        assert_eq!(
            descriptor.properties["dataset"]["dataset_locations"],
            json!(["npl"])
        );
    }

    #[test]
    fn test_non_object_feature_is_rejected() {
        let err = ExportDescriptor::from_feature(json!([1, 2])).unwrap_err();
        assert!(matches!(err, RawDataApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_accessors() {
        let descriptor = ExportDescriptor::from_feature(country_feature()).unwrap();

        assert!(descriptor.hdx_upload());
        assert_eq!(descriptor.update_frequency().as_deref(), Some("daily"));
        assert_eq!(descriptor.label(), "7 [NPL] Nepal");
    }

    #[test]
    fn test_storage_folder() {
        let country = ExportDescriptor::from_feature(country_feature()).unwrap();
        assert_eq!(country.storage_folder().as_deref(), Some("HDX/NPL/"));

        let custom = ExportDescriptor::from_feature(custom_feature()).unwrap();
        assert_eq!(
            custom.storage_folder().as_deref(),
            Some("HDX/hotosm_kathmandu/")
        );
    }
}
