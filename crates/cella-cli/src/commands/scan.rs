//! Scan command implementation.

use anyhow::{Context, Result};
use serde_json::json;

use cella_core::{ScanOptions, scan};

use super::OutputFormat;

pub async fn cmd_scan(timeout: u64, all: bool, format: OutputFormat) -> Result<()> {
    let mut options = ScanOptions::new().duration_secs(timeout);
    if all {
        options = options.all_devices();
    }

    let drives = scan::scan_with_options(options)
        .await
        .context("failed to scan for drives")?;

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = drives
                .iter()
                .map(|d| {
                    json!({
                        "name": d.name,
                        "identifier": d.identifier,
                        "rssi": d.rssi,
                        "is_cella": d.is_cella,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if drives.is_empty() {
                println!("No drives found.");
                return Ok(());
            }
            for drive in &drives {
                let name = drive.name.as_deref().unwrap_or("(unnamed)");
                let rssi = drive
                    .rssi
                    .map(|r| format!("{} dBm", r))
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<24} {:<20} {}", name, drive.identifier, rssi);
            }
        }
    }

    Ok(())
}
