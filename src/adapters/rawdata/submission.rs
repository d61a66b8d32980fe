//! Snapshot submission with two-tier retry
//!
//! The first tier retries throttling statuses (429, 502 by default) and
//! transport failures with exponential backoff. When throttling outlasts the
//! first tier, the submission cools down and starts over, up to
//! `max_cooldown_cycles` times.

use super::client::{ensure_success, RawDataClient};
use crate::adapters::clock::Sleeper;
use crate::config::SubmissionConfig;
use crate::domain::{HdxError, RawDataApiError, RequestConfig, Result, TaskId};
use crate::log_retry_attempt;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Deserialize)]
struct SnapshotAccepted {
    task_id: TaskId,
}

/// Submits merged request configurations to `POST /custom/snapshot/`
#[derive(Clone)]
pub struct SubmissionClient {
    client: RawDataClient,
    policy: SubmissionConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl SubmissionClient {
    pub fn new(client: RawDataClient, policy: SubmissionConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    /// Submits one request and returns the task id the API assigned
    ///
    /// # Errors
    ///
    /// - `HdxError::Submission` when throttling persists after every cooldown
    /// - `HdxError::Api` for any other failure, including a non-retryable
    ///   status or exhausted transport retries
    pub async fn submit(&self, request: &RequestConfig) -> Result<TaskId> {
        let url = self.client.endpoint(["custom", "snapshot", ""])?;
        let body = serde_json::to_value(request)?;

        let max_cycles = self.policy.max_cooldown_cycles;
        let mut cycle = 0;

        loop {
            match self.submit_with_backoff(&url, &body).await {
                Ok(task_id) => {
                    tracing::info!(task_id = %task_id, "Snapshot request accepted");
                    return Ok(task_id);
                }
                Err(RawDataApiError::RateLimited { status, attempts }) if cycle < max_cycles => {
                    cycle += 1;
                    let cooldown = self.policy.cooldown();
                    tracing::warn!(
                        status = status,
                        attempts = attempts,
                        cycle = cycle,
                        max_cycles = max_cycles,
                        cooldown_secs = cooldown.as_secs(),
                        "Rate limit reached, waiting before resubmitting"
                    );
                    self.sleeper.sleep(cooldown).await;
                }
                Err(RawDataApiError::RateLimited { status, attempts }) => {
                    return Err(HdxError::Submission(format!(
                        "still rate limited (status {status}) after {attempts} attempts \
                         and {cycle} cooldown cycles"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// First tier: one submission with fast retries
    ///
    /// A retryable status that survives every retry comes back as
    /// `RateLimited`.
    async fn submit_with_backoff(
        &self,
        url: &Url,
        body: &Value,
    ) -> std::result::Result<TaskId, RawDataApiError> {
        let max_attempts = self.policy.transport_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.post_once(url, body).await {
                Ok(task_id) => return Ok(task_id),
                Err(e) => e,
            };

            let throttled = self.throttling_status(&err);
            if attempt < max_attempts && (throttled.is_some() || err.is_transport()) {
                log_retry_attempt!(attempt, max_attempts, err);
                self.sleeper.sleep(self.policy.backoff_delay(attempt)).await;
                continue;
            }

            return Err(match throttled {
                Some(status) => RawDataApiError::RateLimited {
                    status,
                    attempts: attempt,
                },
                None => err,
            });
        }
    }

    fn throttling_status(&self, err: &RawDataApiError) -> Option<u16> {
        match err {
            RawDataApiError::HttpStatus { status, .. }
                if self.policy.retry_statuses.contains(status) =>
            {
                Some(*status)
            }
            _ => None,
        }
    }

    async fn post_once(&self, url: &Url, body: &Value) -> std::result::Result<TaskId, RawDataApiError> {
        let response = self
            .client
            .post(url.clone(), self.client.submit_timeout())
            .json(body)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let accepted: SnapshotAccepted = response
            .json()
            .await
            .map_err(|e| RawDataApiError::InvalidResponse(format!("snapshot response: {e}")))?;
        Ok(accepted.task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::RecordingSleeper;
    use crate::config::ApiConfig;
    use std::time::Duration;

    fn submission(server_url: &str, sleeper: &RecordingSleeper) -> SubmissionClient {
        let api = ApiConfig {
            base_url: server_url.to_string(),
            ..Default::default()
        };
        SubmissionClient::new(
            RawDataClient::new(&api).unwrap(),
            SubmissionConfig::default(),
            Arc::new(sleeper.clone()),
        )
    }

    #[tokio::test]
    async fn test_submit_returns_task_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/custom/snapshot/")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(r#"{"iso3":"NPL"}"#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"task_id": "abc-123", "track_link": "/tasks/status/abc-123/"}"#)
            .create_async()
            .await;

        let sleeper = RecordingSleeper::new();
        let request = RequestConfig {
            iso3: Some("NPL".to_string()),
            ..Default::default()
        };
        let task_id = submission(&server.url(), &sleeper)
            .submit(&request)
            .await
            .unwrap();

        assert_eq!(task_id.as_str(), "abc-123");
        assert!(sleeper.waits().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_retryable_status_fails_immediately() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/custom/snapshot/")
            .with_status(422)
            .with_body(r#"{"detail": "invalid geometry"}"#)
            .expect(1)
            .create_async()
            .await;

        let sleeper = RecordingSleeper::new();
        let err = submission(&server.url(), &sleeper)
            .submit(&RequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HdxError::Api(RawDataApiError::HttpStatus { status: 422, .. })
        ));
        assert!(sleeper.waits().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_task_id_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/custom/snapshot/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"queued": true}"#)
            .create_async()
            .await;

        let sleeper = RecordingSleeper::new();
        let err = submission(&server.url(), &sleeper)
            .submit(&RequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HdxError::Api(RawDataApiError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_gives_up_after_cooldown_cycles() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/custom/snapshot/")
            .with_status(429)
            .expect(6)
            .create_async()
            .await;

        let api = ApiConfig {
            base_url: server.url(),
            ..Default::default()
        };
        let policy = SubmissionConfig {
            transport_retries: 1,
            max_cooldown_cycles: 2,
            ..Default::default()
        };
        let sleeper = RecordingSleeper::new();
        let client = SubmissionClient::new(
            RawDataClient::new(&api).unwrap(),
            policy,
            Arc::new(sleeper.clone()),
        );

        let err = client.submit(&RequestConfig::default()).await.unwrap_err();

        assert!(matches!(err, HdxError::Submission(_)));
        assert_eq!(sleeper.count_of(Duration::from_secs(61)), 2);
        assert_eq!(sleeper.count_of(Duration::from_secs(1)), 3);
        mock.assert_async().await;
    }
}
