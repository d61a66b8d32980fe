//! Inspect command implementation
//!
//! Shows what an export left in storage and how its last run went.

use crate::adapters::rawdata::{DiscoveryClient, RawDataClient};
use crate::config::load_config;
use crate::core::inspect::{humanize_size, inspect, ExportInspection};
use crate::domain::{ExportId, Iso3Code};
use clap::{ArgGroup, Args};

/// Arguments for the inspect command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("export").required(true).args(["iso3", "id"])))]
pub struct InspectArgs {
    /// Country export by ISO3 code
    #[arg(long)]
    pub iso3: Option<Iso3Code>,

    /// Export by id
    #[arg(long)]
    pub id: Option<ExportId>,
}

impl InspectArgs {
    /// Execute the inspect command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let client = match RawDataClient::new(&config.api) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to create API client: {e}");
                return Ok(2);
            }
        };
        let discovery = DiscoveryClient::new(client.clone(), config.discovery.clone());

        let descriptor = match (&self.iso3, self.id) {
            (Some(iso3), _) => discovery.by_iso3(iso3).await,
            (None, Some(id)) => discovery.by_id(id).await,
            (None, None) => None,
        };
        let Some(descriptor) = descriptor else {
            println!("❌ Export not found");
            return Ok(1);
        };

        match inspect(&client, &descriptor).await {
            Ok(inspection) => {
                print_inspection(&inspection);
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Inspection failed");
                eprintln!("Failed to inspect export: {e}");
                Ok(4)
            }
        }
    }
}

fn print_inspection(inspection: &ExportInspection) {
    let storage = &inspection.storage;
    println!("📦 {}", inspection.export);
    println!("  Folder: {}", storage.folder);
    println!("  Files: {}", storage.file_count);
    println!("  Size: {}", humanize_size(storage.total_size));
    println!(
        "  Last Modified: {}",
        storage
            .latest_modified
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!();

    let Some(run) = &inspection.last_run else {
        println!("No run metadata found");
        return;
    };

    println!("🕒 Last Run:");
    println!("  Started: {}", run.started_at.as_deref().unwrap_or("N/A"));
    println!(
        "  Processing Time: {}",
        run.elapsed_time.as_deref().unwrap_or("N/A")
    );
    println!(
        "  HDX Upload: Total: {}, Success: {}, Failed: {}, Skipped: {}",
        run.dataset_count, run.uploads.success, run.uploads.failed, run.uploads.skipped
    );
    println!();

    for dataset in &run.datasets {
        println!(
            "  {} ({})",
            dataset.category,
            dataset.name.as_deref().unwrap_or("unnamed")
        );
        println!("    Resources: {}", dataset.resources);
        println!("    Total Size: {}", humanize_size(dataset.total_size));
        println!(
            "    Formats: {}",
            dataset.formats.iter().cloned().collect::<Vec<_>>().join(", ")
        );
        if let Some(url) = &dataset.hdx_url {
            println!("    HDX: {url}");
        }
    }
}
