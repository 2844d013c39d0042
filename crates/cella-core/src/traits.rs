//! Trait abstractions for Cella drive operations.
//!
//! This module provides the [`CellaDrive`] trait that abstracts over real
//! Bluetooth drives and mock drives for testing.

use async_trait::async_trait;

use cella_types::Configuration;

use crate::device::{Device, DriveInfo};
use crate::error::Result;

/// Trait abstracting Cella drive operations.
///
/// Enables code that works with both real Bluetooth drives and mock drives
/// in tests.
///
/// # Example
///
/// ```ignore
/// use cella_core::{CellaDrive, Result};
///
/// async fn print_config<D: CellaDrive>(drive: &D) -> Result<()> {
///     let config = drive.read_config().await?;
///     println!("{}", config);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait CellaDrive: Send + Sync {
    /// Check if the drive is connected.
    async fn is_connected(&self) -> bool;

    /// Disconnect from the drive.
    async fn disconnect(&self) -> Result<()>;

    /// Get the drive's advertised name, if available.
    fn name(&self) -> Option<&str>;

    /// Get the drive's address or platform identifier.
    fn address(&self) -> &str;

    /// Read and decode the drive's configuration record.
    async fn read_config(&self) -> Result<Configuration>;

    /// Encode and write a configuration record to the drive.
    async fn write_config(&self, config: &Configuration) -> Result<()>;

    /// Read whether the drive is currently locked.
    async fn read_locked(&self) -> Result<bool>;

    /// Read the drive's identity strings.
    async fn read_drive_info(&self) -> Result<DriveInfo>;

    /// Read the current RSSI (signal strength) in dBm.
    async fn read_rssi(&self) -> Result<i16>;
}

#[async_trait]
impl CellaDrive for Device {
    async fn is_connected(&self) -> bool {
        Device::is_connected(self).await
    }

    async fn disconnect(&self) -> Result<()> {
        Device::disconnect(self).await
    }

    fn name(&self) -> Option<&str> {
        Device::name(self)
    }

    fn address(&self) -> &str {
        Device::address(self)
    }

    async fn read_config(&self) -> Result<Configuration> {
        Device::read_config(self).await
    }

    async fn write_config(&self, config: &Configuration) -> Result<()> {
        Device::write_config(self, config).await
    }

    async fn read_locked(&self) -> Result<bool> {
        Device::read_locked(self).await
    }

    async fn read_drive_info(&self) -> Result<DriveInfo> {
        Device::read_drive_info(self).await
    }

    async fn read_rssi(&self) -> Result<i16> {
        Device::read_rssi(self).await
    }
}
