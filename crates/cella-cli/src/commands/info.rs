//! Info command implementation.

use anyhow::{Context, Result};
use serde_json::json;

use cella_core::Device;

use super::OutputFormat;

pub async fn cmd_info(device: &str, format: OutputFormat) -> Result<()> {
    let drive = Device::connect(device)
        .await
        .with_context(|| format!("failed to connect to '{}'", device))?;

    let result = async {
        let info = drive.read_drive_info().await?;
        let locked = drive.read_locked().await?;
        let rssi = drive.read_rssi().await.ok();
        Ok::<_, cella_core::Error>((info, locked, rssi))
    }
    .await;

    // Disconnect before reporting, whether the reads worked or not.
    drive.disconnect().await.ok();
    let (info, locked, rssi) = result.context("failed to read drive info")?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "name": info.name,
                    "model": info.model,
                    "serial": info.serial,
                    "firmware": info.firmware,
                    "manufacturer": info.manufacturer,
                    "locked": locked,
                    "rssi": rssi,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Name:         {}", info.name);
            println!("Model:        {}", info.model);
            println!("Serial:       {}", info.serial);
            println!("Firmware:     {}", info.firmware);
            println!("Manufacturer: {}", info.manufacturer);
            println!("Locked:       {}", if locked { "yes" } else { "no" });
            if let Some(rssi) = rssi {
                println!("Signal:       {} dBm", rssi);
            }
        }
    }

    Ok(())
}
