//! Cella drive connection and communication.
//!
//! This module provides the main interface for connecting to and
//! communicating with Cella drives over Bluetooth Low Energy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::{Adapter, Peripheral};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::scan::{ScanOptions, find_device, find_device_with_options};
use crate::util::{create_identifier, format_peripheral_id};
use cella_types::uuids::{
    CONFIG_STATE, DEVICE_NAME, FIRMWARE_REVISION, LOCK_STATUS, MANUFACTURER_NAME, MODEL_NUMBER,
    SERIAL_NUMBER,
};
use cella_types::{Configuration, Schema};

/// Default timeout for establishing a BLE connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for service discovery after connection.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for BLE characteristic read/write operations.
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeouts for BLE connection and operations.
///
/// Increase these in challenging RF environments (thick walls, interference).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Timeout for establishing a BLE connection.
    pub connect_timeout: Duration,
    /// Timeout for service discovery after connection.
    pub discovery_timeout: Duration,
    /// Timeout for characteristic read operations.
    pub read_timeout: Duration,
    /// Timeout for characteristic write operations.
    pub write_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            read_timeout: DEFAULT_OPERATION_TIMEOUT,
            write_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Create a new connection config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the service discovery timeout.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Set the read timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// Identity strings read from a drive's Device Information service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveInfo {
    /// Advertised device name.
    pub name: String,
    /// Model number.
    pub model: String,
    /// Serial number.
    pub serial: String,
    /// Firmware revision.
    pub firmware: String,
    /// Manufacturer name.
    pub manufacturer: String,
}

/// Represents a connected Cella drive.
///
/// `Device` intentionally does not implement `Clone`: it owns an active BLE
/// connection, and cloning would make connection ownership ambiguous. Wrap
/// it in `Arc` to share across tasks.
///
/// Call [`Device::disconnect`] before dropping the device; dropping a
/// still-connected device logs a warning.
pub struct Device {
    /// Kept alive for the lifetime of the peripheral connection.
    #[allow(dead_code)]
    adapter: Adapter,
    peripheral: Peripheral,
    name: Option<String>,
    /// MAC address on Linux/Windows, peripheral UUID on macOS.
    address: String,
    /// Characteristics discovered at connect time, keyed by UUID.
    characteristics: HashMap<Uuid, Characteristic>,
    disconnected: AtomicBool,
    config: ConnectionConfig,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Device {
    /// Connect to a Cella drive by name or address.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cella_core::Device;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let drive = Device::connect("Cella 04F2").await?;
    ///     let config = drive.read_config().await?;
    ///     println!("{}", config);
    ///     drive.disconnect().await?;
    ///     Ok(())
    /// }
    /// ```
    #[tracing::instrument(level = "info", skip_all, fields(identifier = %identifier))]
    pub async fn connect(identifier: &str) -> Result<Self> {
        Self::connect_with_config(identifier, ConnectionConfig::default()).await
    }

    /// Connect to a Cella drive with custom timeouts.
    #[tracing::instrument(level = "info", skip_all, fields(identifier = %identifier))]
    pub async fn connect_with_config(identifier: &str, config: ConnectionConfig) -> Result<Self> {
        // Specific lookups should see every device, not just recognized ones.
        let options = ScanOptions::default().all_devices();

        let (adapter, peripheral) = match find_device(identifier).await {
            Ok(found) => found,
            Err(_) => find_device_with_options(identifier, options).await?,
        };

        Self::from_peripheral_with_config(adapter, peripheral, config).await
    }

    /// Create a `Device` from an already-discovered peripheral.
    pub async fn from_peripheral(adapter: Adapter, peripheral: Peripheral) -> Result<Self> {
        Self::from_peripheral_with_config(adapter, peripheral, ConnectionConfig::default()).await
    }

    /// Create a `Device` from an already-discovered peripheral with custom timeouts.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn from_peripheral_with_config(
        adapter: Adapter,
        peripheral: Peripheral,
        config: ConnectionConfig,
    ) -> Result<Self> {
        info!("connecting to drive...");
        timeout(config.connect_timeout, peripheral.connect())
            .await
            .map_err(|_| Error::timeout("connect to drive", config.connect_timeout))??;

        debug!("discovering services...");
        timeout(config.discovery_timeout, peripheral.discover_services())
            .await
            .map_err(|_| Error::timeout("discover services", config.discovery_timeout))??;

        let mut characteristics = HashMap::new();
        for service in peripheral.services() {
            for characteristic in service.characteristics {
                characteristics.insert(characteristic.uuid, characteristic);
            }
        }
        debug!("discovered {} characteristics", characteristics.len());

        let properties = peripheral.properties().await?;
        let name = properties.as_ref().and_then(|p| p.local_name.clone());
        let address = properties
            .as_ref()
            .map(|p| create_identifier(&p.address.to_string(), &peripheral.id()))
            .unwrap_or_else(|| format_peripheral_id(&peripheral.id()));

        info!(name = ?name, %address, "connected");

        Ok(Self {
            adapter,
            peripheral,
            name,
            address,
            characteristics,
            disconnected: AtomicBool::new(false),
            config,
        })
    }

    /// Check if the drive is connected (queries BLE stack state).
    pub async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    /// Disconnect from the drive.
    #[tracing::instrument(level = "info", skip(self), fields(name = ?self.name))]
    pub async fn disconnect(&self) -> Result<()> {
        self.disconnected.store(true, Ordering::SeqCst);
        self.peripheral.disconnect().await?;
        Ok(())
    }

    /// Get the drive's advertised name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the drive's address or platform identifier.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Read the current RSSI (signal strength) in dBm.
    pub async fn read_rssi(&self) -> Result<i16> {
        let properties = self.peripheral.properties().await?;
        properties
            .and_then(|p| p.rssi)
            .ok_or_else(|| Error::InvalidData("RSSI not available".to_string()))
    }

    fn find_characteristic(&self, uuid: Uuid) -> Result<&Characteristic> {
        self.characteristics.get(&uuid).ok_or_else(|| {
            Error::characteristic_not_found(uuid.to_string(), self.peripheral.services().len())
        })
    }

    /// Read a characteristic value by UUID, guarded by the read timeout.
    pub async fn read_characteristic(&self, uuid: Uuid) -> Result<Vec<u8>> {
        let characteristic = self.find_characteristic(uuid)?;
        let data = timeout(self.config.read_timeout, self.peripheral.read(characteristic))
            .await
            .map_err(|_| {
                Error::timeout(format!("read characteristic {}", uuid), self.config.read_timeout)
            })??;
        Ok(data)
    }

    /// Write a value to a characteristic, guarded by the write timeout.
    pub async fn write_characteristic(&self, uuid: Uuid, data: &[u8]) -> Result<()> {
        let characteristic = self.find_characteristic(uuid)?;
        timeout(
            self.config.write_timeout,
            self.peripheral
                .write(characteristic, data, WriteType::WithResponse),
        )
        .await
        .map_err(|_| {
            Error::timeout(format!("write characteristic {}", uuid), self.config.write_timeout)
        })??;
        Ok(())
    }

    /// Read and decode the drive's configuration record.
    #[tracing::instrument(level = "debug", skip(self), fields(name = ?self.name))]
    pub async fn read_config(&self) -> Result<Configuration> {
        let data = self.read_characteristic(CONFIG_STATE).await?;
        Ok(Schema::device().decode(&data)?)
    }

    /// Encode and write a configuration record to the drive.
    ///
    /// The configuration must carry a value for every schema field; see
    /// [`Schema::encode`] for the failure modes.
    #[tracing::instrument(level = "debug", skip_all, fields(name = ?self.name))]
    pub async fn write_config(&self, config: &Configuration) -> Result<()> {
        let data = Schema::device().encode(config)?;
        info!("writing configuration: {}", config);
        self.write_characteristic(CONFIG_STATE, &data).await
    }

    /// Read whether the drive is currently locked.
    pub async fn read_locked(&self) -> Result<bool> {
        let data = self.read_characteristic(LOCK_STATUS).await?;
        match data.first() {
            Some(byte) => Ok(*byte != 0),
            None => Err(Error::InvalidData("empty lock status".to_string())),
        }
    }

    /// Read the drive's identity strings.
    ///
    /// Characteristics that are absent or unreadable are left empty rather
    /// than failing the whole read.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn read_drive_info(&self) -> Result<DriveInfo> {
        fn read_string(result: Result<Vec<u8>>) -> String {
            result
                .map(|data| {
                    String::from_utf8(data)
                        .unwrap_or_default()
                        .trim_end_matches('\0')
                        .to_string()
                })
                .unwrap_or_default()
        }

        let (name, model, serial, firmware, manufacturer) = tokio::join!(
            self.read_characteristic(DEVICE_NAME),
            self.read_characteristic(MODEL_NUMBER),
            self.read_characteristic(SERIAL_NUMBER),
            self.read_characteristic(FIRMWARE_REVISION),
            self.read_characteristic(MANUFACTURER_NAME),
        );

        Ok(DriveInfo {
            name: read_string(name),
            model: read_string(model),
            serial: read_string(serial),
            firmware: read_string(firmware),
            manufacturer: read_string(manufacturer),
        })
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if !self.disconnected.load(Ordering::SeqCst) {
            warn!(
                name = ?self.name,
                "Device dropped without disconnect; BLE resources may leak"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert_eq!(config.read_timeout, Duration::from_secs(10));
        assert_eq!(config.write_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_connection_config_builder() {
        let config = ConnectionConfig::new()
            .connect_timeout(Duration::from_secs(30))
            .read_timeout(Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert_eq!(config.write_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_drive_info_default_is_empty() {
        let info = DriveInfo::default();
        assert!(info.name.is_empty());
        assert!(info.serial.is_empty());
    }
}
