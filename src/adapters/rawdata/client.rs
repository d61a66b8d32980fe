//! Raw Data API HTTP client
//!
//! [`RawDataClient`] owns the HTTP session, base URL and access token. It is
//! built once per run and passed to every component that talks to the API.

use crate::config::{ApiConfig, SecretString};
use crate::domain::{HdxError, RawDataApiError, Result};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Header carrying the API token
pub const ACCESS_TOKEN_HEADER: &str = "Access-Token";

/// Client for the Raw Data API
///
/// # Example
///
/// ```no_run
/// use hdxctl::adapters::rawdata::RawDataClient;
/// use hdxctl::config::ApiConfig;
///
/// # fn example() -> hdxctl::domain::Result<()> {
/// let client = RawDataClient::new(&ApiConfig::default())?;
/// println!("{}", client.base_url());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RawDataClient {
    http: Client,
    base_url: Url,
    access_token: Option<SecretString>,
    config: ApiConfig,
}

impl RawDataClient {
    /// Create a client from API configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL cannot be parsed or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            HdxError::Configuration(format!("Invalid api.base_url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(HdxError::Configuration(format!(
                "api.base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("hdxctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HdxError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            access_token: config.access_token.clone(),
            config: config.clone(),
        })
    }

    /// Base URL of the API
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// API settings the client was built with
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Whether requests carry an access token
    pub fn is_authenticated(&self) -> bool {
        self.config.has_access_token()
    }

    /// Builds an endpoint URL from path segments
    ///
    /// A trailing `""` segment produces the trailing slash the API expects,
    /// e.g. `["tasks", "status", id, ""]` gives `{base}/tasks/status/{id}/`.
    /// Segments are percent-encoded individually.
    pub fn endpoint<'a, I>(&self, segments: I) -> std::result::Result<Url, RawDataApiError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RawDataApiError::InvalidResponse(format!(
                    "base URL {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET request with the access token attached
    pub fn get(&self, url: Url, timeout: Duration) -> RequestBuilder {
        self.authorize(self.http.get(url).timeout(timeout))
    }

    /// POST request with the access token attached
    pub fn post(&self, url: Url, timeout: Duration) -> RequestBuilder {
        self.authorize(self.http.post(url).timeout(timeout))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => {
                let value: &str = token.expose_secret().as_ref();
                request.header(ACCESS_TOKEN_HEADER, value)
            }
            None => request,
        }
    }

    /// Sends a GET and decodes a JSON body, failing on non-success statuses
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        timeout: Duration,
    ) -> std::result::Result<T, RawDataApiError> {
        let response = self.get(url, timeout).send().await?;
        let response = ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RawDataApiError::InvalidResponse(e.to_string()))
    }

    /// Timeout of a snapshot submission attempt
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.config.submit_timeout_seconds)
    }

    /// Timeout of a single export lookup
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.config.lookup_timeout_seconds)
    }

    /// Timeout of a listing page request
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.config.page_timeout_seconds)
    }

    /// Timeout of a task status request
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.config.status_timeout_seconds)
    }
}

/// Turns a non-success response into [`RawDataApiError::HttpStatus`]
pub async fn ensure_success(response: Response) -> std::result::Result<Response, RawDataApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RawDataApiError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}
