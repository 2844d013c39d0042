//! Drive discovery and scanning.
//!
//! This module provides functionality to scan for Cella drives using
//! Bluetooth Low Energy.

use std::time::Duration;

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{DeviceNotFoundReason, Error, Result};
use crate::util::{create_identifier, format_peripheral_id};
use cella_types::uuids::{CELLA_SERVICE, MANUFACTURER_ID};

/// Information about a discovered Cella drive.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// The advertised name (e.g., "Cella 04F2").
    pub name: Option<String>,
    /// The peripheral ID for connecting.
    pub id: PeripheralId,
    /// The BLE address as a string (all zeros on macOS, use `identifier`).
    pub address: String,
    /// A connection identifier that is stable on the current platform.
    pub identifier: String,
    /// RSSI signal strength in dBm, if reported.
    pub rssi: Option<i16>,
    /// Whether the advertisement identifies a Cella drive.
    pub is_cella: bool,
    /// Raw manufacturer data from the advertisement, if present.
    pub manufacturer_data: Option<Vec<u8>>,
}

/// Options for scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// How long to scan for drives.
    pub duration: Duration,
    /// Only return devices that identify as Cella drives.
    pub cella_only: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
            cella_only: true,
        }
    }
}

impl ScanOptions {
    /// Create new scan options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan duration.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the scan duration in seconds.
    #[must_use]
    pub fn duration_secs(mut self, secs: u64) -> Self {
        self.duration = Duration::from_secs(secs);
        self
    }

    /// Include every BLE device in range, not just Cella drives.
    #[must_use]
    pub fn all_devices(mut self) -> Self {
        self.cella_only = false;
        self
    }
}

/// Get the first available Bluetooth adapter.
pub async fn get_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;

    adapters
        .into_iter()
        .next()
        .ok_or(Error::DeviceNotFound(DeviceNotFoundReason::NoAdapter))
}

/// Scan for Cella drives in range.
///
/// Returns a list of discovered drives; an empty list means none were found
/// (not an error).
///
/// # Errors
///
/// Returns an error if no Bluetooth adapter is available or the scan could
/// not be started or stopped.
pub async fn scan_for_devices() -> Result<Vec<DiscoveredDevice>> {
    scan_with_options(ScanOptions::default()).await
}

/// Scan for drives with custom options.
pub async fn scan_with_options(options: ScanOptions) -> Result<Vec<DiscoveredDevice>> {
    let adapter = get_adapter().await?;
    scan_with_adapter(&adapter, options).await
}

/// Scan for drives using a specific adapter.
pub async fn scan_with_adapter(
    adapter: &Adapter,
    options: ScanOptions,
) -> Result<Vec<DiscoveredDevice>> {
    info!(duration_secs = options.duration.as_secs(), "starting BLE scan");

    adapter.start_scan(ScanFilter::default()).await?;
    sleep(options.duration).await;
    adapter.stop_scan().await?;

    let mut discovered = Vec::new();
    for peripheral in adapter.peripherals().await? {
        match inspect_peripheral(&peripheral).await {
            Ok(Some(device)) if device.is_cella || !options.cella_only => {
                info!(name = ?device.name, "found drive");
                discovered.push(device);
            }
            Ok(_) => {}
            Err(e) => debug!("error inspecting peripheral: {}", e),
        }
    }

    info!("scan complete, {} drive(s) found", discovered.len());
    Ok(discovered)
}

/// Read a peripheral's advertisement and classify it.
async fn inspect_peripheral(peripheral: &Peripheral) -> Result<Option<DiscoveredDevice>> {
    let Some(properties) = peripheral.properties().await? else {
        return Ok(None);
    };

    let id = peripheral.id();
    let address = properties.address.to_string();
    let identifier = create_identifier(&address, &id);
    let manufacturer_data = properties.manufacturer_data.get(&MANUFACTURER_ID).cloned();

    Ok(Some(DiscoveredDevice {
        is_cella: is_cella_drive(&properties),
        name: properties.local_name,
        id,
        address,
        identifier,
        rssi: properties.rssi,
        manufacturer_data,
    }))
}

/// Check whether an advertisement identifies a Cella drive.
///
/// A drive is recognized by its manufacturer ID, its advertised vendor
/// service, or as a fallback its name.
fn is_cella_drive(properties: &btleplug::api::PeripheralProperties) -> bool {
    if properties.manufacturer_data.contains_key(&MANUFACTURER_ID) {
        return true;
    }

    if properties.services.contains(&CELLA_SERVICE)
        || properties.service_data.contains_key(&CELLA_SERVICE)
    {
        return true;
    }

    properties
        .local_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains("cella"))
}

/// Find a specific drive by name or address.
pub async fn find_device(identifier: &str) -> Result<(Adapter, Peripheral)> {
    find_device_with_options(identifier, ScanOptions::default()).await
}

/// Find a specific drive by name or address with custom options.
///
/// Checks peripherals cached from earlier scans first, then performs up to
/// three scan attempts with growing durations. BLE advertisements can be
/// missed on any single scan.
pub async fn find_device_with_options(
    identifier: &str,
    options: ScanOptions,
) -> Result<(Adapter, Peripheral)> {
    let adapter = get_adapter().await?;
    let needle = identifier.to_lowercase();

    info!("looking for drive: {}", identifier);

    if let Some(peripheral) = match_known_peripheral(&adapter, &needle).await? {
        debug!("found drive in adapter cache, no scan needed");
        return Ok((adapter, peripheral));
    }

    let max_attempts: u32 = 3;
    let base = options.duration.max(Duration::from_secs(2));

    for attempt in 1..=max_attempts {
        debug!("scan attempt {}/{}", attempt, max_attempts);

        adapter.start_scan(ScanFilter::default()).await?;
        sleep(base * attempt).await;
        adapter.stop_scan().await?;

        if let Some(peripheral) = match_known_peripheral(&adapter, &needle).await? {
            info!("found drive on attempt {}", attempt);
            return Ok((adapter, peripheral));
        }
    }

    warn!("drive not found after {} attempts: {}", max_attempts, identifier);
    Err(Error::device_not_found(identifier))
}

/// Search the adapter's known peripherals for one matching the identifier.
///
/// Matches against the peripheral ID, the Bluetooth address (with or without
/// colons), and finally the advertised name (partial match).
async fn match_known_peripheral(
    adapter: &Adapter,
    needle: &str,
) -> Result<Option<Peripheral>> {
    for peripheral in adapter.peripherals().await? {
        let Ok(Some(props)) = peripheral.properties().await else {
            continue;
        };

        let peripheral_id = format_peripheral_id(&peripheral.id()).to_lowercase();
        if peripheral_id.contains(needle) {
            return Ok(Some(peripheral));
        }

        let address = props.address.to_string().to_lowercase();
        if address != "00:00:00:00:00:00"
            && (address == needle || address.replace(':', "") == needle.replace(':', ""))
        {
            return Ok(Some(peripheral));
        }

        if let Some(name) = &props.local_name
            && name.to_lowercase().contains(needle)
        {
            return Ok(Some(peripheral));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_options_defaults() {
        let options = ScanOptions::default();
        assert_eq!(options.duration, Duration::from_secs(5));
        assert!(options.cella_only);
    }

    #[test]
    fn test_scan_options_builder() {
        let options = ScanOptions::new().duration_secs(12).all_devices();
        assert_eq!(options.duration, Duration::from_secs(12));
        assert!(!options.cella_only);
    }
}
