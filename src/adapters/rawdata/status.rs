//! Task status lookup

use super::client::RawDataClient;
use crate::domain::{TaskId, TaskStatus};
use serde::Deserialize;
use serde_json::Value;

/// One answer of `GET /tasks/status/{id}/`
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: TaskStatus,
    pub result: Option<Value>,
}

impl StatusReport {
    fn error() -> Self {
        Self {
            status: TaskStatus::Error,
            result: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    status: String,
    #[serde(default)]
    result: Option<Value>,
}

impl RawDataClient {
    /// Current status of a task
    ///
    /// Any failure to obtain an answer is reported as `ERROR`.
    pub async fn task_status(&self, task_id: &TaskId) -> StatusReport {
        let url = match self.endpoint(["tasks", "status", task_id.as_str(), ""]) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(task_id = %task_id, error = %e, "Cannot build status URL");
                return StatusReport::error();
            }
        };

        match self.get_json::<RawStatus>(url, self.status_timeout()).await {
            Ok(raw) => StatusReport {
                status: TaskStatus::parse(&raw.status),
                result: raw.result.filter(|r| !r.is_null()),
            },
            Err(e) => {
                tracing::error!(task_id = %task_id, error = %e, "Error in status request");
                StatusReport::error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;

    fn client(server_url: &str) -> RawDataClient {
        let api = ApiConfig {
            base_url: server_url.to_string(),
            ..Default::default()
        };
        RawDataClient::new(&api).unwrap()
    }

    #[tokio::test]
    async fn test_task_status_success_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tasks/status/t-1/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "t-1", "status": "SUCCESS", "result": {"download_url": "s3://x"}}"#)
            .create_async()
            .await;

        let report = client(&server.url())
            .task_status(&TaskId::new("t-1").unwrap())
            .await;

        assert_eq!(report.status, TaskStatus::Success);
        assert_eq!(report.result, Some(json!({"download_url": "s3://x"})));
    }

    #[tokio::test]
    async fn test_task_status_http_failure_reads_as_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tasks/status/t-2/")
            .with_status(500)
            .create_async()
            .await;

        let report = client(&server.url())
            .task_status(&TaskId::new("t-2").unwrap())
            .await;

        assert_eq!(report.status, TaskStatus::Error);
        assert!(report.result.is_none());
    }

    #[tokio::test]
    async fn test_task_status_pending_without_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tasks/status/t-3/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "PENDING", "result": null}"#)
            .create_async()
            .await;

        let report = client(&server.url())
            .task_status(&TaskId::new("t-3").unwrap())
            .await;

        assert_eq!(report.status, TaskStatus::Pending);
        assert!(report.result.is_none());
    }
}
