//! Shared helpers for cella-core.

use btleplug::platform::PeripheralId;

/// Extract the identifier string from a peripheral ID.
///
/// Peripheral IDs are UUIDs on macOS and address-derived strings elsewhere;
/// either way the debug representation wraps the useful part in
/// `PeripheralId(...)`.
pub fn format_peripheral_id(id: &PeripheralId) -> String {
    format!("{:?}", id)
        .trim_start_matches("PeripheralId(")
        .trim_end_matches(')')
        .to_string()
}

/// Pick a stable connection identifier for a peripheral.
///
/// macOS reports the address as all zeros, so the peripheral ID is used
/// there; other platforms use the Bluetooth MAC address.
pub fn create_identifier(address: &str, peripheral_id: &PeripheralId) -> String {
    if address == "00:00:00:00:00:00" {
        format_peripheral_id(peripheral_id)
    } else {
        address.to_string()
    }
}
