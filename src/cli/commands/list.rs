//! List command implementation

use crate::adapters::rawdata::{DiscoveryClient, RawDataClient};
use crate::config::load_config;
use crate::domain::ExportDescriptor;
use clap::Args;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only exports with this update frequency
    #[arg(long, value_name = "FREQUENCY")]
    pub frequency: Option<String>,

    /// Only country exports (those with an ISO3 code)
    #[arg(long)]
    pub countries_only: bool,
}

impl ListArgs {
    /// Execute the list command
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
        let discovery = DiscoveryClient::new(client, config.discovery.clone());

        let listing = match &self.frequency {
            Some(frequency) => discovery.list_scheduled(frequency).await,
            None => discovery.list_all().await,
        };
        let descriptors = match listing {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "Listing failed");
                eprintln!("Failed to list exports: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let shown = self.filter(descriptors);
        println!("{:>6}  {:<5} {:<10} TITLE", "ID", "ISO3", "FREQUENCY");
        for descriptor in &shown {
            let dataset = descriptor.dataset().unwrap_or_default();
            println!(
                "{:>6}  {:<5} {:<10} {}",
                descriptor.id.map(|id| id.to_string()).unwrap_or_default(),
                descriptor.iso3_code().unwrap_or_else(|| "-".to_string()),
                dataset.update_frequency.as_deref().unwrap_or("-"),
                dataset
                    .dataset_title
                    .as_deref()
                    .or(dataset.dataset_prefix.as_deref())
                    .unwrap_or("")
            );
        }
        println!();
        println!("{} exports", shown.len());

        Ok(0)
    }

    fn filter(&self, descriptors: Vec<ExportDescriptor>) -> Vec<ExportDescriptor> {
        if !self.countries_only {
            return descriptors;
        }
        descriptors
            .into_iter()
            .filter(|d| d.iso3_code().is_some())
            .collect()
    }
}
