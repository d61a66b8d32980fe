//! Trigger run orchestration
//!
//! A run collects export descriptors from the selected sources, builds one
//! request per descriptor and submits it. Failures are isolated per export.
//! Tracking is a separate step over the task ids the run produced.

use crate::adapters::clock::Sleeper;
use crate::adapters::rawdata::{DiscoveryClient, RawDataClient, SubmissionClient};
use crate::config::HdxConfig;
use crate::core::merge::ConfigMerger;
use crate::core::poller::StatusPoller;
use crate::core::summary::{RunError, RunSummary};
use crate::domain::{
    ExportDescriptor, ExportId, HdxError, Iso3Code, Result, TaskId, TaskResults,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Frequency used by the event trigger when none is given
pub const DEFAULT_FREQUENCY: &str = "daily";

/// Which exports a run covers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSelection {
    /// Country exports by ISO3 code
    pub iso3: Vec<Iso3Code>,

    /// Exports by id
    pub ids: Vec<ExportId>,

    /// Every export with this update frequency
    pub scheduled: Option<String>,
}

impl ExportSelection {
    /// Whether no source is selected
    pub fn is_empty(&self) -> bool {
        self.iso3.is_empty() && self.ids.is_empty() && self.scheduled.is_none()
    }
}

/// Payload of the scheduled event trigger
///
/// ```
/// use hdxctl::core::orchestrator::TriggerEvent;
///
/// let event: TriggerEvent = serde_json::from_str(r#"{"iso3": ["npl"]}"#).unwrap();
/// assert_eq!(event.fetch_scheduled_exports.as_deref(), Some("daily"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerEvent {
    #[serde(default)]
    pub iso3: Option<Vec<String>>,

    #[serde(default)]
    pub ids: Option<Vec<u64>>,

    /// Absent means `daily`; an explicit `null` disables scheduled exports
    #[serde(default = "default_event_frequency")]
    pub fetch_scheduled_exports: Option<String>,
}

fn default_event_frequency() -> Option<String> {
    Some(DEFAULT_FREQUENCY.to_string())
}

impl TriggerEvent {
    /// Converts the event into a validated selection
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed ISO3 code
    pub fn into_selection(self) -> Result<ExportSelection> {
        let iso3 = self
            .iso3
            .unwrap_or_default()
            .iter()
            .map(|code| Iso3Code::new(code).map_err(HdxError::Validation))
            .collect::<Result<Vec<_>>>()?;
        Ok(ExportSelection {
            iso3,
            ids: self
                .ids
                .unwrap_or_default()
                .into_iter()
                .map(ExportId::new)
                .collect(),
            scheduled: self.fetch_scheduled_exports.filter(|f| !f.trim().is_empty()),
        })
    }
}

/// Discovery, merge, submission and optional tracking
pub struct Orchestrator {
    discovery: DiscoveryClient,
    merger: ConfigMerger,
    submission: SubmissionClient,
    poller: StatusPoller,
    results_path: PathBuf,
    dry_run: bool,
}

impl Orchestrator {
    /// Wires every component to one shared API client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API client cannot be built
    pub fn new(config: &HdxConfig, merger: ConfigMerger, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        let client = RawDataClient::new(&config.api)?;
        Ok(Self {
            discovery: DiscoveryClient::new(client.clone(), config.discovery.clone()),
            submission: SubmissionClient::new(
                client.clone(),
                config.submission.clone(),
                Arc::clone(&sleeper),
            ),
            poller: StatusPoller::new(client, config.tracking.poll_interval(), sleeper),
            merger,
            results_path: PathBuf::from(&config.tracking.results_path),
            dry_run: config.application.dry_run,
        })
    }

    /// Build payloads without submitting them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Collects descriptors from every selected source
    ///
    /// Returns the descriptors in source order (ISO3 codes, ids, scheduled)
    /// and the number of lookups that found nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduled listing fails
    pub async fn collect(&self, selection: &ExportSelection) -> Result<(Vec<ExportDescriptor>, usize)> {
        let mut descriptors = Vec::new();
        let mut missed = 0;

        for iso3 in &selection.iso3 {
            match self.discovery.by_iso3(iso3).await {
                Some(descriptor) => descriptors.push(descriptor),
                None => missed += 1,
            }
        }

        for id in &selection.ids {
            match self.discovery.by_id(*id).await {
                Some(descriptor) => descriptors.push(descriptor),
                None => missed += 1,
            }
        }

        if let Some(frequency) = &selection.scheduled {
            descriptors.extend(self.discovery.list_scheduled(frequency).await?);
        }

        Ok((descriptors, missed))
    }

    /// Runs discovery and submits one request per export
    ///
    /// # Errors
    ///
    /// Only a failed scheduled listing aborts the run; per-export failures
    /// are recorded in the summary.
    pub async fn run(&self, selection: &ExportSelection) -> Result<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary::new();

        let (descriptors, missed) = self.collect(selection).await?;
        summary.exports_found = descriptors.len();
        summary.lookups_missed = missed;
        tracing::info!(
            exports = descriptors.len(),
            missed = missed,
            dry_run = self.dry_run,
            "Supplied exports"
        );

        for descriptor in &descriptors {
            let label = descriptor.label();
            match self.process(descriptor).await {
                Ok(Some(task_id)) => summary.add_submitted(label, task_id),
                Ok(None) => summary.dry_run_payloads += 1,
                Err(e) => {
                    crate::log_export_failure!(&label, &e);
                    summary.add_error(RunError::from_error(label, &e));
                }
            }
        }

        let task_ids: Vec<String> = summary.task_ids().iter().map(ToString::to_string).collect();
        tracing::info!(task_ids = ?task_ids, "All requests sent");

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn process(&self, descriptor: &ExportDescriptor) -> Result<Option<TaskId>> {
        let request = self.merger.merge(descriptor)?;

        if self.dry_run {
            let payload = serde_json::to_string(&request)?;
            tracing::info!(
                export = %descriptor.label(),
                payload = %payload,
                "Dry run - request not submitted"
            );
            return Ok(None);
        }

        self.submission.submit(&request).await.map(Some)
    }

    /// Polls the given tasks and writes the results document
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the results document cannot be written
    pub async fn track(&self, task_ids: &[TaskId]) -> Result<TaskResults> {
        tracing::info!(
            tasks = task_ids.len(),
            path = %self.results_path.display(),
            "Tracking task status"
        );
        self.poller.poll_and_persist(task_ids, &self.results_path).await
    }
}
