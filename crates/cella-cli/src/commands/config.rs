//! Config subcommand implementations.

use anyhow::{Context, Result, bail};
use serde_json::json;

use cella_core::Device;
use cella_types::Schema;

use super::OutputFormat;

pub async fn cmd_config_show(device: &str, format: OutputFormat) -> Result<()> {
    let drive = connect(device).await?;
    let result = drive.read_config().await;
    drive.disconnect().await.ok();
    let config = result.context("failed to read configuration")?;

    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = config
                .iter()
                .map(|(field, value)| (field.to_string(), json!(value)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Text => {
            for (field, value) in config.iter() {
                println!("{} = {}", field, value);
            }
        }
    }

    Ok(())
}

pub async fn cmd_config_get(device: &str, field: &str) -> Result<()> {
    let drive = connect(device).await?;
    let result = drive.read_config().await;
    drive.disconnect().await.ok();
    let config = result.context("failed to read configuration")?;

    match config.get(field) {
        Some(value) => println!("{}", value),
        None => bail!("field '{}' not present in configuration", field),
    }

    Ok(())
}

pub async fn cmd_config_set(device: &str, field: &str, value: &str) -> Result<()> {
    let schema = Schema::device();
    if !schema.fields().iter().any(|f| f.name() == field) {
        bail!(
            "unknown field '{}' (known fields: {})",
            field,
            schema
                .fields()
                .iter()
                .map(|f| f.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let drive = connect(device).await?;

    // Read-modify-write so other fields keep their current values.
    let result = async {
        let mut config = drive.read_config().await?;
        config.set(field, value);
        drive.write_config(&config).await?;
        drive.read_config().await
    }
    .await;

    drive.disconnect().await.ok();
    let config = result.context("failed to update configuration")?;

    println!("{} = {}", field, config.get(field).unwrap_or("?"));
    Ok(())
}

async fn connect(device: &str) -> Result<Device> {
    Device::connect(device)
        .await
        .with_context(|| format!("failed to connect to '{}'", device))
}
