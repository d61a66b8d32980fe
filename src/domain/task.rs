//! Asynchronous task states and results

use super::ids::TaskId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Status reported by `GET /tasks/status/{id}/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Queued, not yet picked up
    Pending,
    /// Running
    Started,
    /// Finished with a result payload
    Success,
    /// Finished unsuccessfully
    Failure,
    /// Could not be resolved (including failed status requests)
    Error,
    /// Anything else the server reports
    Other(String),
}

impl TaskStatus {
    /// Parses a status string, case-insensitively
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "STARTED" => Self::Started,
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            "ERROR" => Self::Error,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// SUCCESS, FAILURE or ERROR
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Error)
    }

    /// PENDING or STARTED
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Pending | Self::Started)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Started => write!(f, "STARTED"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
            Self::Error => write!(f, "ERROR"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Terminal outcome of one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskOutcome {
    /// Completed with the server's result payload
    Success(Value),
    /// Failed; carries the server's result if one was sent
    Failure(Option<Value>),
    /// Errored; carries the server's result if one was sent
    Error(Option<Value>),
}

impl TaskOutcome {
    /// Short status label
    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Success(_) => TaskStatus::Success,
            Self::Failure(_) => TaskStatus::Failure,
            Self::Error(_) => TaskStatus::Error,
        }
    }

    /// Whether the task succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Task results keyed by task id
///
/// Entries are write-once: the first terminal outcome recorded for a task
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskResults(BTreeMap<TaskId, TaskOutcome>);

impl TaskResults {
    /// Creates an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outcome; returns false if the task already had one
    pub fn record(&mut self, task_id: TaskId, outcome: TaskOutcome) -> bool {
        use std::collections::btree_map::Entry;
        match self.0.entry(task_id) {
            Entry::Vacant(slot) => {
                slot.insert(outcome);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Outcome of a task
    pub fn get(&self, task_id: &TaskId) -> Option<&TaskOutcome> {
        self.0.get(task_id)
    }

    /// Iterates outcomes in task id order
    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &TaskOutcome)> {
        self.0.iter()
    }

    /// Number of recorded tasks
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of successful tasks
    pub fn success_count(&self) -> usize {
        self.0.values().filter(|o| o.is_success()).count()
    }

    /// Writes the results document as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns an I/O or serialization error
    pub async fn persist(&self, path: impl AsRef<Path>) -> crate::domain::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, body).await?;
        tracing::info!(path = %path.display(), tasks = self.len(), "Task results written");
        Ok(())
    }
}
