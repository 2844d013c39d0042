//! Error types for cella-core.
//!
//! This module defines all error types that can occur when communicating
//! with Cella drives over Bluetooth Low Energy.
//!
//! Codec failures ([`cella_types::ConfigError`]) and layout errors from the
//! drive are deterministic and should not be retried. BLE-level failures
//! (`Bluetooth`, `Timeout`, `ConnectionFailed`) can be transient; whether to
//! retry is left to the caller, as this crate deliberately carries no retry
//! layer.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when communicating with Cella drives.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Drive not found during scan or connection.
    #[error("drive not found: {0}")]
    DeviceNotFound(DeviceNotFoundReason),

    /// Operation attempted while not connected to a drive.
    #[error("not connected to drive")]
    NotConnected,

    /// Required BLE characteristic not found on the drive.
    #[error("characteristic not found: {uuid} (searched {service_count} services)")]
    CharacteristicNotFound {
        /// The UUID that was not found.
        uuid: String,
        /// Number of services that were searched.
        service_count: usize,
    },

    /// Failed to interpret data received from the drive.
    #[error("invalid data from drive: {0}")]
    InvalidData(String),

    /// Configuration record failed to encode or decode.
    #[error("configuration error: {0}")]
    Config(#[from] cella_types::ConfigError),

    /// Operation timed out.
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// Connection failed with a specific reason.
    #[error("connection failed: {reason}")]
    ConnectionFailed {
        /// The drive identifier that failed to connect, if known.
        device_id: Option<String>,
        /// The structured reason for the failure.
        reason: ConnectionFailureReason,
    },

    /// Write operation failed.
    #[error("write failed to characteristic {uuid}: {reason}")]
    WriteFailed {
        /// The characteristic UUID.
        uuid: String,
        /// The reason for the failure.
        reason: String,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Structured reasons for connection failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConnectionFailureReason {
    /// Bluetooth adapter not available or powered off.
    AdapterUnavailable,
    /// Drive is out of range.
    OutOfRange,
    /// Connection attempt timed out.
    Timeout,
    /// Other/unknown error.
    Other(String),
}

impl std::fmt::Display for ConnectionFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AdapterUnavailable => write!(f, "Bluetooth adapter unavailable"),
            Self::OutOfRange => write!(f, "drive out of range"),
            Self::Timeout => write!(f, "connection timed out"),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Reason why a drive was not found.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum DeviceNotFoundReason {
    /// No drives found during scan.
    NoDevicesInRange,
    /// Drive with the given name/address not found.
    NotFound {
        /// The identifier that was searched for.
        identifier: String,
    },
    /// No Bluetooth adapter available.
    NoAdapter,
}

impl std::fmt::Display for DeviceNotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDevicesInRange => write!(f, "no drives in range"),
            Self::NotFound { identifier } => write!(f, "drive '{}' not found", identifier),
            Self::NoAdapter => write!(f, "no Bluetooth adapter available"),
        }
    }
}

impl Error {
    /// Create a drive not found error for a specific identifier.
    pub fn device_not_found(identifier: impl Into<String>) -> Self {
        Self::DeviceNotFound(DeviceNotFoundReason::NotFound {
            identifier: identifier.into(),
        })
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a characteristic not found error.
    pub fn characteristic_not_found(uuid: impl Into<String>, service_count: usize) -> Self {
        Self::CharacteristicNotFound {
            uuid: uuid.into(),
            service_count,
        }
    }
}

/// Result type alias using cella-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::device_not_found("Cella 04F2");
        assert!(err.to_string().contains("Cella 04F2"));

        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "not connected to drive");

        let err = Error::characteristic_not_found("c5a11001", 3);
        assert!(err.to_string().contains("c5a11001"));
        assert!(err.to_string().contains("3 services"));

        let err = Error::timeout("read config", Duration::from_secs(10));
        assert!(err.to_string().contains("read config"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_config_error_conversion() {
        let codec_err = cella_types::ConfigError::LengthMismatch {
            expected: 1,
            actual: 0,
        };
        let err: Error = codec_err.into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("expected 1 bytes"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "adapter gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_connection_failure_reason_display() {
        assert_eq!(
            ConnectionFailureReason::AdapterUnavailable.to_string(),
            "Bluetooth adapter unavailable"
        );
        assert_eq!(
            ConnectionFailureReason::Other("busy".to_string()).to_string(),
            "busy"
        );
    }
}
