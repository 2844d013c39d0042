//! Mock drive implementation for testing.
//!
//! This module provides a mock drive that can be used for unit testing
//! without BLE hardware. [`MockDrive`] implements the
//! [`CellaDrive`](crate::traits::CellaDrive) trait, so it is
//! interchangeable with a real [`Device`](crate::device::Device) in generic
//! code, and supports failure injection for exercising error paths.

use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use cella_types::{Configuration, Schema};

use crate::device::DriveInfo;
use crate::error::{Error, Result};
use crate::traits::CellaDrive;

/// A mock Cella drive for testing.
///
/// # Example
///
/// ```
/// use cella_core::{CellaDrive, MockDrive};
///
/// #[tokio::main]
/// async fn main() {
///     let drive = MockDrive::new("Cella TEST");
///     drive.connect().await.unwrap();
///     let config = drive.read_config().await.unwrap();
///     assert_eq!(config.get("encryption_level"), Some("0"));
/// }
/// ```
pub struct MockDrive {
    name: String,
    address: String,
    connected: AtomicBool,
    locked: AtomicBool,
    /// Raw record bytes, exactly as a real drive would hand them over.
    config_record: RwLock<Vec<u8>>,
    info: RwLock<DriveInfo>,
    rssi: AtomicI16,
    write_count: AtomicU32,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
}

impl std::fmt::Debug for MockDrive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDrive")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("connected", &self.connected.load(Ordering::Relaxed))
            .finish()
    }
}

impl MockDrive {
    /// Create a new mock drive with default values (unencrypted, unlocked).
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            connected: AtomicBool::new(false),
            locked: AtomicBool::new(false),
            config_record: RwLock::new(vec![0]),
            info: RwLock::new(DriveInfo {
                name: name.to_string(),
                model: "Cella One".to_string(),
                serial: "MOCK-0001".to_string(),
                firmware: "1.0.0".to_string(),
                manufacturer: "Cella".to_string(),
            }),
            rssi: AtomicI16::new(-55),
            write_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
            fail_message: RwLock::new("mock failure".to_string()),
        }
    }

    /// Create a builder for a customized mock drive.
    pub fn builder(name: &str) -> MockDriveBuilder {
        MockDriveBuilder {
            name: name.to_string(),
            address: None,
            record: None,
            locked: false,
            rssi: -55,
        }
    }

    /// Connect to the mock drive.
    pub async fn connect(&self) -> Result<()> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::device_not_found(self.name.clone()));
        }
        self.connected.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Make subsequent operations fail with the given message.
    pub async fn set_should_fail(&self, fail: bool, message: &str) {
        self.should_fail.store(fail, Ordering::Relaxed);
        *self.fail_message.write().await = message.to_string();
    }

    /// Replace the raw configuration record the drive will serve.
    ///
    /// Accepts arbitrary bytes so tests can simulate firmware handing back
    /// malformed records.
    pub async fn set_config_record(&self, record: Vec<u8>) {
        *self.config_record.write().await = record;
    }

    /// Set the drive's locked state.
    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::Relaxed);
    }

    /// Number of configuration writes the drive has accepted.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::Relaxed)
    }

    fn check_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    async fn check_should_fail(&self) -> Result<()> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::InvalidData(self.fail_message.read().await.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl CellaDrive for MockDrive {
    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn read_config(&self) -> Result<Configuration> {
        self.check_connected()?;
        self.check_should_fail().await?;
        let record = self.config_record.read().await;
        Ok(Schema::device().decode(&record)?)
    }

    async fn write_config(&self, config: &Configuration) -> Result<()> {
        self.check_connected()?;
        self.check_should_fail().await?;
        let record = Schema::device().encode(config)?;
        *self.config_record.write().await = record;
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn read_locked(&self) -> Result<bool> {
        self.check_connected()?;
        self.check_should_fail().await?;
        Ok(self.locked.load(Ordering::Relaxed))
    }

    async fn read_drive_info(&self) -> Result<DriveInfo> {
        self.check_connected()?;
        self.check_should_fail().await?;
        Ok(self.info.read().await.clone())
    }

    async fn read_rssi(&self) -> Result<i16> {
        self.check_connected()?;
        self.check_should_fail().await?;
        Ok(self.rssi.load(Ordering::Relaxed))
    }
}

/// Builder for constructing a [`MockDrive`] with custom state.
#[must_use]
pub struct MockDriveBuilder {
    name: String,
    address: Option<String>,
    record: Option<Vec<u8>>,
    locked: bool,
    rssi: i16,
}

impl MockDriveBuilder {
    /// Set the drive's address.
    pub fn address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Set the initial configuration record bytes.
    pub fn config_record(mut self, record: Vec<u8>) -> Self {
        self.record = Some(record);
        self
    }

    /// Set the drive's locked state.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Set the reported RSSI.
    pub fn rssi(mut self, rssi: i16) -> Self {
        self.rssi = rssi;
        self
    }

    /// Build the mock drive.
    pub fn build(self) -> MockDrive {
        let mut drive = MockDrive::new(&self.name);
        if let Some(address) = self.address {
            drive.address = address;
        }
        if let Some(record) = self.record {
            drive.config_record = RwLock::new(record);
        }
        drive.locked = AtomicBool::new(self.locked);
        drive.rssi = AtomicI16::new(self.rssi);
        drive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cella_types::ENCRYPTION_LEVEL;

    #[tokio::test]
    async fn test_operations_require_connection() {
        let drive = MockDrive::new("Cella TEST");
        assert!(matches!(
            drive.read_config().await,
            Err(Error::NotConnected)
        ));

        drive.connect().await.unwrap();
        assert!(drive.read_config().await.is_ok());

        drive.disconnect().await.unwrap();
        assert!(!drive.is_connected().await);
    }

    #[tokio::test]
    async fn test_config_write_then_read() {
        let drive = MockDrive::new("Cella TEST");
        drive.connect().await.unwrap();

        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, "2");
        drive.write_config(&config).await.unwrap();

        assert_eq!(drive.write_count(), 1);
        let read_back = drive.read_config().await.unwrap();
        assert_eq!(read_back, config);
    }

    #[tokio::test]
    async fn test_corrupt_record_surfaces_codec_error() {
        let drive = MockDrive::builder("Cella TEST")
            .config_record(vec![9])
            .build();
        drive.connect().await.unwrap();

        assert!(matches!(
            drive.read_config().await,
            Err(Error::Config(cella_types::ConfigError::InvalidValue { .. }))
        ));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let drive = MockDrive::new("Cella TEST");
        drive.connect().await.unwrap();
        drive.set_should_fail(true, "radio interference").await;

        let err = drive.read_config().await.unwrap_err();
        assert!(err.to_string().contains("radio interference"));
    }

    #[tokio::test]
    async fn test_usable_through_trait() {
        async fn lock_state<D: CellaDrive>(drive: &D) -> Result<bool> {
            drive.read_locked().await
        }

        let drive = MockDrive::builder("Cella TEST").locked(true).build();
        drive.connect().await.unwrap();
        assert!(lock_state(&drive).await.unwrap());
    }
}
