//! Export storage listing (`/s3/files/`, `/s3/get/`)

use super::client::RawDataClient;
use crate::domain::RawDataApiError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Timestamp layout of `LastModified`
const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One stored file under an export folder
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredObject {
    pub key: String,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    #[serde(default, deserialize_with = "last_modified")]
    pub last_modified: Option<DateTime<Utc>>,
}

fn last_modified<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, LAST_MODIFIED_FORMAT) {
        return Ok(Some(naive.and_utc()));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(serde::de::Error::custom)
}

impl RawDataClient {
    /// Files stored under a folder prefix
    ///
    /// # Errors
    ///
    /// Returns the API error of the failed request
    pub async fn list_files(&self, folder: &str) -> Result<Vec<StoredObject>, RawDataApiError> {
        let mut url = self.endpoint(["s3", "files", ""])?;
        url.query_pairs_mut().append_pair("folder", folder);
        let files: Option<Vec<StoredObject>> = self.get_json(url, self.page_timeout()).await?;
        Ok(files.unwrap_or_default())
    }

    /// Stored JSON object by key
    ///
    /// # Errors
    ///
    /// Returns `NotFound` on a 404, otherwise the API error of the failed
    /// request
    pub async fn get_object(&self, key: &str) -> Result<Value, RawDataApiError> {
        let segments = ["s3", "get"]
            .into_iter()
            .chain(key.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(segments)?;
        match self.get_json(url, self.lookup_timeout()).await {
            Err(RawDataApiError::HttpStatus { status: 404, .. }) => {
                Err(RawDataApiError::NotFound(key.to_string()))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use chrono::TimeZone;

    fn client(server_url: &str) -> RawDataClient {
        let api = ApiConfig {
            base_url: server_url.to_string(),
            ..Default::default()
        };
        RawDataClient::new(&api).unwrap()
    }

    #[test]
    fn test_stored_object_parses_s3_listing() {
        let object: StoredObject = serde_json::from_str(
            r#"{"Key": "HDX/NPL/meta.json", "Size": 2048, "LastModified": "2024-03-01T10:15:00Z"}"#,
        )
        .unwrap();

        assert_eq!(object.key, "HDX/NPL/meta.json");
        assert_eq!(object.size, 2048);
        assert_eq!(
            object.last_modified,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap())
        );
    }

    #[test]
    fn test_stored_object_without_timestamp() {
        let object: StoredObject = serde_json::from_str(r#"{"Key": "a.zip"}"#).unwrap();
        assert_eq!(object.size, 0);
        assert!(object.last_modified.is_none());
    }

    #[tokio::test]
    async fn test_list_files_passes_folder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/s3/files/")
            .match_query(mockito::Matcher::UrlEncoded(
                "folder".into(),
                "HDX/NPL/".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"Key": "HDX/NPL/a.zip", "Size": 10, "LastModified": "2024-01-01T00:00:00Z"}]"#)
            .create_async()
            .await;

        let files = client(&server.url()).list_files("HDX/NPL/").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 10);
    }

    #[tokio::test]
    async fn test_get_object_missing_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/s3/get/HDX/NPL/meta.json")
            .with_status(404)
            .create_async()
            .await;

        let err = client(&server.url())
            .get_object("HDX/NPL/meta.json")
            .await
            .unwrap_err();
        assert!(matches!(err, RawDataApiError::NotFound(_)));
    }
}
