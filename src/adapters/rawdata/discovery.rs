//! Export discovery via `GET /cron/`
//!
//! Point lookups return at most one descriptor and never fail: misses and
//! exhausted retries are logged and come back as `None`. Listings page
//! through the endpoint until an empty page; a page that fails every attempt
//! fails the whole listing.

use super::client::RawDataClient;
use crate::config::DiscoveryConfig;
use crate::domain::{ExportDescriptor, ExportId, Iso3Code, RawDataApiError};
use crate::log_retry_attempt;
use serde_json::Value;
use url::Url;

type ApiResult<T> = std::result::Result<T, RawDataApiError>;

/// Looks up export descriptors
#[derive(Clone)]
pub struct DiscoveryClient {
    client: RawDataClient,
    config: DiscoveryConfig,
}

impl DiscoveryClient {
    pub fn new(client: RawDataClient, config: DiscoveryConfig) -> Self {
        Self { client, config }
    }

    /// Fetches the export matching `key=value`
    ///
    /// Returns `None` when nothing matches or every attempt failed.
    pub async fn list_by(&self, key: &str, value: &str) -> Option<ExportDescriptor> {
        let url = match self.client.endpoint(["cron", ""]) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair(key, value);
                url
            }
            Err(e) => {
                tracing::error!(key = key, value = value, error = %e, "Cannot build lookup URL");
                return None;
            }
        };

        let max_attempts = self.config.max_attempts;
        for attempt in 1..=max_attempts {
            tracing::info!(key = key, value = value, "Fetching HDX export details");
            match self.fetch_first(url.clone()).await {
                Ok(Some(descriptor)) => return Some(descriptor),
                Ok(None) => {
                    tracing::error!(key = key, value = value, "Export not found");
                    return None;
                }
                Err(e) => {
                    log_retry_attempt!(attempt, max_attempts, e);
                }
            }
        }

        tracing::error!(
            key = key,
            value = value,
            attempts = max_attempts,
            "Failed to fetch HDX export details"
        );
        None
    }

    /// Country export by ISO3 code
    pub async fn by_iso3(&self, iso3: &Iso3Code) -> Option<ExportDescriptor> {
        self.list_by("iso3", iso3.as_str()).await
    }

    /// Export by numeric id
    pub async fn by_id(&self, id: ExportId) -> Option<ExportDescriptor> {
        self.list_by("id", &id.to_string()).await
    }

    /// Every export scheduled with the given update frequency
    ///
    /// # Errors
    ///
    /// Returns `PaginationFailed` if any page fails every attempt
    pub async fn list_scheduled(&self, frequency: &str) -> ApiResult<Vec<ExportDescriptor>> {
        tracing::info!(frequency = frequency, "Retrieving scheduled exports");
        let descriptors = self.paginate(&[("update_frequency", frequency)]).await?;
        tracing::info!(
            frequency = frequency,
            count = descriptors.len(),
            "Scheduled exports retrieved"
        );
        Ok(descriptors)
    }

    /// Every export known to the API
    ///
    /// # Errors
    ///
    /// Returns `PaginationFailed` if any page fails every attempt
    pub async fn list_all(&self) -> ApiResult<Vec<ExportDescriptor>> {
        self.paginate(&[]).await
    }

    async fn fetch_first(&self, url: Url) -> ApiResult<Option<ExportDescriptor>> {
        let features: Vec<Value> = self
            .client
            .get_json(url, self.client.lookup_timeout())
            .await?;
        match features.into_iter().next() {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) if map.is_empty() => Ok(None),
            Some(feature) => ExportDescriptor::from_feature(feature).map(Some),
        }
    }

    async fn paginate(&self, filters: &[(&str, &str)]) -> ApiResult<Vec<ExportDescriptor>> {
        let limit = self.config.page_size;
        let mut skip = 0;
        let mut descriptors = Vec::new();

        loop {
            let page = self.fetch_page(filters, skip, limit).await?;
            if page.is_empty() {
                return Ok(descriptors);
            }
            tracing::debug!(skip = skip, items = page.len(), "Fetched export page");

            for feature in page.into_iter().filter(|f| !f.is_null()) {
                match ExportDescriptor::from_feature(feature) {
                    Ok(descriptor) => descriptors.push(descriptor),
                    Err(e) => tracing::warn!(skip = skip, error = %e, "Skipping malformed export"),
                }
            }
            skip += limit;
        }
    }

    async fn fetch_page(
        &self,
        filters: &[(&str, &str)],
        skip: usize,
        limit: usize,
    ) -> ApiResult<Vec<Value>> {
        let mut url = self.client.endpoint(["cron", ""])?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in filters {
                query.append_pair(key, value);
            }
            query
                .append_pair("skip", &skip.to_string())
                .append_pair("limit", &limit.to_string());
        }

        let max_attempts = self.config.max_attempts;
        for attempt in 1..=max_attempts {
            match self
                .client
                .get_json::<Vec<Value>>(url.clone(), self.client.page_timeout())
                .await
            {
                Ok(page) => return Ok(page),
                Err(e) => {
                    log_retry_attempt!(attempt, max_attempts, e);
                }
            }
        }

        Err(RawDataApiError::PaginationFailed {
            skip,
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;

    fn discovery(server_url: &str) -> DiscoveryClient {
        let api = ApiConfig {
            base_url: server_url.to_string(),
            ..Default::default()
        };
        DiscoveryClient::new(RawDataClient::new(&api).unwrap(), DiscoveryConfig::default())
    }

    fn country_feature(id: u64, iso3: &str) -> Value {
        json!({
            "type": "Feature",
            "iso3": iso3,
            "geometry": {"type": null},
            "properties": {
                "id": id,
                "cid": 1,
                "iso3": iso3,
                "categories": null,
                "dataset": {"dataset_folder": "HDX", "dataset_locations": [iso3.to_lowercase()]}
            }
        })
    }

    #[tokio::test]
    async fn test_list_by_iso3_normalizes_feature() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cron/")
            .match_query(mockito::Matcher::UrlEncoded("iso3".into(), "NPL".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([country_feature(7, "NPL")]).to_string())
            .create_async()
            .await;

        let descriptor = discovery(&server.url())
            .by_iso3(&Iso3Code::new("npl").unwrap())
            .await
            .unwrap();

        assert_eq!(descriptor.id, Some(ExportId::new(7)));
        assert!(descriptor.geometry.is_none());
        assert!(!descriptor.properties.contains_key("cid"));
        assert!(!descriptor.properties.contains_key("categories"));
    }

    #[tokio::test]
    async fn test_list_by_empty_result_is_none() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cron/")
            .match_query(mockito::Matcher::UrlEncoded("id".into(), "999".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let descriptor = discovery(&server.url()).by_id(ExportId::new(999)).await;

        assert!(descriptor.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_by_gives_up_after_three_attempts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cron/")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let descriptor = discovery(&server.url()).list_by("iso3", "KEN").await;

        assert!(descriptor.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failing_page_fails_listing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cron/")
            .match_query(mockito::Matcher::UrlEncoded("skip".into(), "0".into()))
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let err = discovery(&server.url())
            .list_scheduled("weekly")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RawDataApiError::PaginationFailed {
                skip: 0,
                attempts: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_list_all_pages_without_frequency() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cron/")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("skip".into(), "0".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "100".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([country_feature(1, "NPL"), null, country_feature(2, "KEN")]).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/cron/")
            .match_query(mockito::Matcher::UrlEncoded("skip".into(), "100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let descriptors = discovery(&server.url()).list_all().await.unwrap();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].iso3_code().as_deref(), Some("KEN"));
    }
}
