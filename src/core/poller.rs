//! Task status tracking
//!
//! Tasks are polled one after another. A task that is still queued or
//! running is re-polled after a fixed interval until it reaches a terminal
//! state; there is no overall deadline.

use crate::adapters::clock::Sleeper;
use crate::adapters::rawdata::RawDataClient;
use crate::domain::{Result, TaskId, TaskOutcome, TaskResults, TaskStatus};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Polls task status until every task is terminal
#[derive(Clone)]
pub struct StatusPoller {
    client: RawDataClient,
    interval: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl StatusPoller {
    pub fn new(client: RawDataClient, interval: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            client,
            interval,
            sleeper,
        }
    }

    /// Polls every task in order and collects the outcomes
    pub async fn poll_all(&self, task_ids: &[TaskId]) -> TaskResults {
        let mut results = TaskResults::new();
        for task_id in task_ids {
            let outcome = self.poll(task_id).await;
            if !results.record(task_id.clone(), outcome) {
                tracing::debug!(task_id = %task_id, "Task already tracked, keeping first outcome");
            }
        }
        tracing::info!(
            tasks = results.len(),
            successful = results.success_count(),
            "Task statuses fetched"
        );
        results
    }

    /// Polls every task and writes the results document
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the document cannot be written
    pub async fn poll_and_persist(
        &self,
        task_ids: &[TaskId],
        results_path: impl AsRef<Path>,
    ) -> Result<TaskResults> {
        let results = self.poll_all(task_ids).await;
        results.persist(results_path).await?;
        Ok(results)
    }

    /// Polls a single task to its terminal outcome
    ///
    /// A status other than SUCCESS, PENDING or STARTED on the first poll is
    /// recorded as FAILURE without a payload.
    pub async fn poll(&self, task_id: &TaskId) -> TaskOutcome {
        let first = self.client.task_status(task_id).await;
        match first.status {
            TaskStatus::Success => TaskOutcome::Success(first.result.unwrap_or(Value::Null)),
            TaskStatus::Pending | TaskStatus::Started => self.wait_for_completion(task_id).await,
            other => {
                tracing::warn!(task_id = %task_id, status = %other, "Task not accepted, recording FAILURE");
                TaskOutcome::Failure(None)
            }
        }
    }

    async fn wait_for_completion(&self, task_id: &TaskId) -> TaskOutcome {
        loop {
            tracing::info!(
                task_id = %task_id,
                wait_secs = self.interval.as_secs(),
                "Task in progress, polling again after interval"
            );
            self.sleeper.sleep(self.interval).await;

            let report = self.client.task_status(task_id).await;
            let outcome = match report.status {
                TaskStatus::Success => TaskOutcome::Success(report.result.unwrap_or(Value::Null)),
                TaskStatus::Failure => TaskOutcome::Failure(report.result),
                TaskStatus::Error => TaskOutcome::Error(report.result),
                status => {
                    tracing::debug!(task_id = %task_id, status = %status, "Task not finished");
                    continue;
                }
            };
            tracing::info!(task_id = %task_id, status = %outcome.status(), "Task finished");
            return outcome;
        }
    }
}
