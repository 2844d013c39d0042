//! Bluetooth UUIDs for Cella drives.
//!
//! This module contains the UUIDs needed to talk to a Cella secure storage
//! drive over Bluetooth Low Energy.

use uuid::{Uuid, uuid};

// --- Cella Service UUIDs ---

/// Cella vendor service UUID.
pub const CELLA_SERVICE: Uuid = uuid!("c5a11000-6f2d-4c8b-9e41-7a30b2d855c1");

/// Cella manufacturer ID for BLE advertisements.
pub const MANUFACTURER_ID: u16 = 0x05EC;

// --- Cella Characteristic UUIDs ---

/// Configuration record characteristic (read/write).
///
/// Carries the fixed-layout record described by `Schema::device`.
pub const CONFIG_STATE: Uuid = uuid!("c5a11001-6f2d-4c8b-9e41-7a30b2d855c1");

/// Command characteristic for drive control.
pub const COMMAND: Uuid = uuid!("c5a11002-6f2d-4c8b-9e41-7a30b2d855c1");

/// Lock status characteristic.
pub const LOCK_STATUS: Uuid = uuid!("c5a11003-6f2d-4c8b-9e41-7a30b2d855c1");

// --- Standard BLE Service UUIDs ---

/// Device Information service.
pub const DEVICE_INFO_SERVICE: Uuid = uuid!("0000180a-0000-1000-8000-00805f9b34fb");

// --- Device Information Characteristic UUIDs ---

/// Device name characteristic.
pub const DEVICE_NAME: Uuid = uuid!("00002a00-0000-1000-8000-00805f9b34fb");

/// Model number string characteristic.
pub const MODEL_NUMBER: Uuid = uuid!("00002a24-0000-1000-8000-00805f9b34fb");

/// Serial number string characteristic.
pub const SERIAL_NUMBER: Uuid = uuid!("00002a25-0000-1000-8000-00805f9b34fb");

/// Firmware revision string characteristic.
pub const FIRMWARE_REVISION: Uuid = uuid!("00002a26-0000-1000-8000-00805f9b34fb");

/// Manufacturer name string characteristic.
pub const MANUFACTURER_NAME: Uuid = uuid!("00002a29-0000-1000-8000-00805f9b34fb");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cella_uuids_share_vendor_base() {
        for uuid in [CELLA_SERVICE, CONFIG_STATE, COMMAND, LOCK_STATUS] {
            assert!(
                uuid.to_string().starts_with("c5a11"),
                "UUID {} should use the Cella vendor base",
                uuid
            );
        }
    }

    #[test]
    fn test_cella_uuids_are_distinct() {
        assert_ne!(CELLA_SERVICE, CONFIG_STATE);
        assert_ne!(CONFIG_STATE, COMMAND);
        assert_ne!(COMMAND, LOCK_STATUS);
    }

    #[test]
    fn test_standard_characteristics_use_16_bit_base() {
        for uuid in [
            DEVICE_NAME,
            MODEL_NUMBER,
            SERIAL_NUMBER,
            FIRMWARE_REVISION,
            MANUFACTURER_NAME,
        ] {
            assert!(
                uuid.to_string().starts_with("00002a"),
                "UUID {} should start with 00002a",
                uuid
            );
        }
    }

    #[test]
    fn test_manufacturer_id() {
        assert_eq!(MANUFACTURER_ID, 0x05EC);
    }
}
