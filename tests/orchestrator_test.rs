//! End-to-end tests of a trigger run against a mock Raw Data API
//!
//! Covers descriptor collection, merging with language keywords, isolated
//! per-export failures, dry runs and tracking.

use hdxctl::adapters::clock::RecordingSleeper;
use hdxctl::config::HdxConfig;
use hdxctl::core::merge::ConfigMerger;
use hdxctl::core::orchestrator::{ExportSelection, Orchestrator};
use hdxctl::core::summary::RunErrorType;
use hdxctl::domain::{ExportId, Iso3Code, LanguageTable, RequestConfig, TaskId};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    sleeper: RecordingSleeper,
    results_dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            sleeper: RecordingSleeper::new(),
            results_dir: TempDir::new().unwrap(),
        }
    }

    fn results_path(&self) -> std::path::PathBuf {
        self.results_dir.path().join("result.json")
    }

    fn orchestrator(&self) -> Orchestrator {
        let mut config = HdxConfig::default();
        config.api.base_url = self.server.uri();
        config.tracking.results_path = self.results_path().display().to_string();

        let base: RequestConfig = serde_json::from_value(json!({
            "hdx_upload": false,
            "categories": [
                {"Buildings": {"select": ["name", "building"], "types": ["polygons"]}},
                {"Roads": {"select": ["name", "highway"], "types": ["lines"]}}
            ]
        }))
        .unwrap();
        let languages = LanguageTable::new(HashMap::from([(
            "NPL".to_string(),
            vec!["name:ne".to_string()],
        )]));

        Orchestrator::new(
            &config,
            ConfigMerger::new(base, Some(languages)),
            Arc::new(self.sleeper.clone()),
        )
        .unwrap()
    }

    async fn mount_lookup(&self, key: &str, value: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path("/cron/"))
            .and(query_param(key, value))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    async fn mount_submission(&self, matches: Value, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/custom/snapshot/"))
            .and(body_partial_json(matches))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    async fn submitted_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.method.as_str() == "POST")
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

fn nepal_feature() -> Value {
    json!([{
        "type": "Feature",
        "iso3": "npl",
        "geometry": {"type": null},
        "properties": {
            "id": 1,
            "iso3": "NPL",
            "hdx_upload": true,
            "dataset": {
                "dataset_title": "Nepal",
                "dataset_folder": "HDX",
                "dataset_locations": ["npl"],
                "update_frequency": "daily"
            }
        }
    }])
}

fn custom_feature(id: u64) -> Value {
    json!([{
        "type": "Feature",
        "geometry": {"type": "Polygon", "coordinates": [[[85, 27], [86, 27], [86, 28], [85, 27]]]},
        "properties": {
            "id": id,
            "dataset": {
                "dataset_title": "Kathmandu valley",
                "dataset_prefix": format!("custom_{id}"),
                "dataset_folder": "HDX",
                "update_frequency": "weekly"
            }
        }
    }])
}

fn selection(iso3: &[&str], ids: &[u64]) -> ExportSelection {
    ExportSelection {
        iso3: iso3.iter().map(|c| Iso3Code::new(c).unwrap()).collect(),
        ids: ids.iter().copied().map(ExportId::new).collect(),
        scheduled: None,
    }
}

#[tokio::test]
async fn test_run_isolates_failures_and_counts_misses() {
    let harness = Harness::start().await;
    harness.mount_lookup("iso3", "NPL", nepal_feature()).await;
    harness.mount_lookup("iso3", "KEN", json!([])).await;
    harness.mount_lookup("id", "7", custom_feature(7)).await;
    harness
        .mount_submission(
            json!({"iso3": "NPL"}),
            ResponseTemplate::new(200).set_body_json(json!({"task_id": "task-npl"})),
        )
        .await;
    harness
        .mount_submission(
            json!({"dataset": {"dataset_prefix": "custom_7"}}),
            ResponseTemplate::new(422).set_body_json(json!({"detail": "bad geometry"})),
        )
        .await;

    let summary = harness
        .orchestrator()
        .run(&selection(&["NPL", "KEN"], &[7]))
        .await
        .unwrap();

    assert_eq!(summary.exports_found, 2);
    assert_eq!(summary.lookups_missed, 1);
    assert_eq!(summary.task_ids(), vec![TaskId::new("task-npl").unwrap()]);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].error_type, RunErrorType::Rejected);
    assert!(summary.is_partial());
    assert!(!summary.has_connection_errors());
    assert!(harness.sleeper.waits().is_empty());
}

#[tokio::test]
async fn test_country_payload_carries_language_keywords() {
    let harness = Harness::start().await;
    harness.mount_lookup("iso3", "NPL", nepal_feature()).await;
    harness
        .mount_submission(
            json!({"iso3": "NPL"}),
            ResponseTemplate::new(200).set_body_json(json!({"task_id": "task-npl"})),
        )
        .await;

    harness
        .orchestrator()
        .run(&selection(&["NPL"], &[]))
        .await
        .unwrap();

    let bodies = harness.submitted_bodies().await;
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["hdx_upload"], json!(true));
    assert_eq!(
        body["categories"][0]["Buildings"]["select"],
        json!(["name", "building", "name:ne"])
    );
    assert_eq!(
        body["categories"][1]["Roads"]["select"],
        json!(["name", "highway", "name:ne"])
    );
    assert_eq!(body["dataset"]["dataset_locations"], json!(["npl"]));
}

#[tokio::test]
async fn test_dry_run_submits_nothing() {
    let harness = Harness::start().await;
    harness.mount_lookup("iso3", "NPL", nepal_feature()).await;
    harness.mount_lookup("id", "7", custom_feature(7)).await;

    let summary = harness
        .orchestrator()
        .with_dry_run(true)
        .run(&selection(&["NPL"], &[7]))
        .await
        .unwrap();

    assert_eq!(summary.exports_found, 2);
    assert_eq!(summary.dry_run_payloads, 2);
    assert!(summary.submitted.is_empty());
    assert!(summary.is_successful());
    assert!(harness.submitted_bodies().await.is_empty());
}

#[tokio::test]
async fn test_scheduled_listing_failure_aborts_run() {
    let harness = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/cron/"))
        .and(query_param("update_frequency", "daily"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.server)
        .await;

    let result = harness
        .orchestrator()
        .run(&ExportSelection {
            scheduled: Some("daily".to_string()),
            ..Default::default()
        })
        .await;

    assert!(result.is_err());
    assert!(harness.submitted_bodies().await.is_empty());
}

#[tokio::test]
async fn test_run_then_track_writes_results() {
    let harness = Harness::start().await;
    harness.mount_lookup("iso3", "NPL", nepal_feature()).await;
    harness
        .mount_submission(
            json!({"iso3": "NPL"}),
            ResponseTemplate::new(200).set_body_json(json!({"task_id": "task-npl"})),
        )
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/status/task-npl/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING"})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/status/task-npl/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "SUCCESS", "result": {"size": 2048}})),
        )
        .with_priority(2)
        .mount(&harness.server)
        .await;

    let orchestrator = harness.orchestrator();
    let summary = orchestrator.run(&selection(&["NPL"], &[])).await.unwrap();
    let results = orchestrator.track(&summary.task_ids()).await.unwrap();

    assert_eq!(results.success_count(), 1);
    assert_eq!(harness.sleeper.waits(), vec![Duration::from_secs(30)]);

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(harness.results_path()).unwrap()).unwrap();
    assert_eq!(
        written["task-npl"],
        json!({"status": "SUCCESS", "result": {"size": 2048}})
    );
}
