//! Platform-agnostic types for Cella secure storage drives.
//!
//! This crate provides the shared types used by the BLE layer (cella-core)
//! and any other consumer of the drive's wire formats:
//!
//! - The fixed-schema binary configuration codec ([`Schema`],
//!   [`Configuration`], [`FieldSpec`])
//! - Error types for the codec
//! - UUID constants for BLE services and characteristics
//!
//! # Example
//!
//! ```
//! use cella_types::{Configuration, ENCRYPTION_LEVEL, Schema};
//!
//! let schema = Schema::device();
//! let config = schema.decode(&[1]).unwrap();
//! assert_eq!(config.get(ENCRYPTION_LEVEL), Some("1"));
//! ```

pub mod config;
pub mod error;
pub mod uuid;

pub use config::{
    Configuration, ENCRYPTION_LEVEL, EncryptionLevel, FieldSpec, FieldValidator, Schema,
};
pub use error::{ConfigError, ConfigResult};
pub use crate::uuid as uuids;

#[cfg(test)]
mod tests {
    use super::*;

    // --- Round-trip property ---

    mod round_trip {
        use super::*;
        use proptest::prelude::*;

        fn test_schema() -> Schema {
            Schema::new(vec![
                FieldSpec::new("encryption_level", 1, |v| v <= 2),
                FieldSpec::new("lock_timeout", 2, |_| true),
                FieldSpec::new("beacon_key", 8, |_| true),
            ])
        }

        proptest! {
            #[test]
            fn decode_of_encode_is_identity(
                level in 0u8..=2,
                timeout in any::<u16>(),
                key in any::<u64>(),
            ) {
                let schema = test_schema();
                let mut config = Configuration::new();
                config.set("encryption_level", level.to_string());
                config.set("lock_timeout", timeout.to_string());
                config.set("beacon_key", key.to_string());

                let bytes = schema.encode(&config).unwrap();
                prop_assert_eq!(bytes.len(), schema.total_width());
                prop_assert_eq!(schema.decode(&bytes).unwrap(), config);
            }

            #[test]
            fn encode_of_decode_is_identity(record in proptest::collection::vec(any::<u8>(), 11)) {
                let schema = test_schema();
                // Records whose first byte is out of domain fail validation;
                // all others must round-trip byte for byte.
                match schema.decode(&record) {
                    Ok(config) => {
                        prop_assert_eq!(schema.encode(&config).unwrap(), record);
                    }
                    Err(err) => {
                        prop_assert!(record[0] > 2, "unexpected decode error: {}", err);
                    }
                }
            }

            #[test]
            fn wrong_length_never_decodes(record in proptest::collection::vec(any::<u8>(), 0..32)) {
                let schema = test_schema();
                prop_assume!(record.len() != schema.total_width());
                let is_length_mismatch = matches!(
                    schema.decode(&record),
                    Err(ConfigError::LengthMismatch { .. })
                );
                prop_assert!(is_length_mismatch);
            }
        }
    }

    // --- Serialization ---

    #[test]
    fn test_configuration_serialization_round_trip() {
        let config = Schema::device().decode(&[2]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_encryption_level_serialization() {
        assert_eq!(
            serde_json::to_string(&EncryptionLevel::DualFactor).unwrap(),
            "\"DualFactor\""
        );
    }

    // --- Error display ---

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::LengthMismatch {
            expected: 1,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "invalid record length: expected 1 bytes, got 4"
        );

        let err = ConfigError::InvalidValue {
            field: "encryption_level".to_string(),
            value: 9,
        };
        assert_eq!(err.to_string(), "invalid value for field 'encryption_level': 9");
    }
}
