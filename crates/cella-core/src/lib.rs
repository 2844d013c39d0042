//! BLE communication layer for Cella secure storage drives.
//!
//! This crate provides device discovery, connection management, and
//! configuration read/write for Cella drives over Bluetooth Low Energy.
//!
//! # Features
//!
//! - **Drive discovery**: Scan for nearby Cella drives
//! - **Configuration**: Read and write the drive's fixed-layout
//!   configuration record (codec in [`cella_types`])
//! - **Drive identity**: Model, serial, firmware, lock state
//! - **Testing**: [`CellaDrive`] trait seam plus a [`MockDrive`]
//!
//! # Platform Differences
//!
//! Drive identification varies by platform. On macOS, drives are identified
//! by a CoreBluetooth UUID that is stable per machine but is not the MAC
//! address. On Linux and Windows, drives are identified by their Bluetooth
//! MAC address. [`Device::address`] returns whichever is appropriate.
//!
//! # Quick Start
//!
//! ```no_run
//! use cella_core::{Device, scan};
//! use cella_types::ENCRYPTION_LEVEL;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let drives = scan::scan_for_devices().await?;
//!     println!("found {} drive(s)", drives.len());
//!
//!     let drive = Device::connect("Cella 04F2").await?;
//!     let mut config = drive.read_config().await?;
//!     config.set(ENCRYPTION_LEVEL, "2");
//!     drive.write_config(&config).await?;
//!     drive.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod mock;
pub mod scan;
pub mod traits;
pub mod util;

pub use device::{ConnectionConfig, Device, DriveInfo};
pub use error::{ConnectionFailureReason, DeviceNotFoundReason, Error, Result};
pub use mock::{MockDrive, MockDriveBuilder};
pub use scan::{DiscoveredDevice, ScanOptions};
pub use traits::CellaDrive;

// Re-export the shared types crate for convenience.
pub use cella_types::{Configuration, ENCRYPTION_LEVEL, EncryptionLevel, Schema};
pub use cella_types::uuid as uuids;
