//! Fixed-schema binary configuration codec.
//!
//! A Cella drive stores its settings as a fixed-size binary record with no
//! version tag or length prefix; both ends agree on the layout out of band.
//! The layout is declared once as a [`Schema`] (an ordered list of
//! [`FieldSpec`] entries) and the decoded form is a [`Configuration`], an
//! insertion-ordered map from field name to value.
//!
//! Validation happens only at the codec boundary: [`Schema::decode`] checks
//! every field against its declared domain, while [`Configuration::set`]
//! accepts anything. The map is schema-agnostic storage; the schema carries
//! the layout and the validation policy.

use core::fmt;

use bytes::{Buf, BufMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Field name for the drive's encryption level.
pub const ENCRYPTION_LEVEL: &str = "encryption_level";

/// Validity predicate applied to a decoded field value.
pub type FieldValidator = fn(u64) -> bool;

/// A single field in a configuration record: name, byte width, and domain.
///
/// Specs are declared once (see [`Schema::device`]) and shared read-only by
/// every codec call.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    name: &'static str,
    width: usize,
    validate: FieldValidator,
}

impl FieldSpec {
    /// Declare a field.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or greater than 8 (field values are carried
    /// as `u64`).
    #[must_use]
    pub const fn new(name: &'static str, width: usize, validate: FieldValidator) -> Self {
        assert!(width >= 1 && width <= 8, "field width must be 1..=8 bytes");
        Self {
            name,
            width,
            validate,
        }
    }

    /// The field's name, unique within a schema.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The field's width in bytes.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Check a value against the field's declared domain.
    #[must_use]
    pub fn is_valid(&self, value: u64) -> bool {
        (self.validate)(value)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The validator is a bare fn pointer; printing it adds nothing.
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

/// Ordered declaration of the fields in a configuration record.
///
/// Field order is fixed and defines both the byte layout on the wire and
/// the iteration order of decoded configurations.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema from an ordered list of field specs.
    #[must_use]
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The current Cella drive schema.
    ///
    /// ```text
    /// struct config_st {
    ///     uint8_t encryption_level; // 0 - unencrypted, 1 - single factor, 2 - dual factor
    /// };
    /// ```
    ///
    /// Fields are decoded as unsigned integers, so the domain check here is
    /// strict: only 0, 1 and 2 pass. Firmware that emits a signed byte for
    /// this field (0xFF for -1) will be rejected at decode time.
    #[must_use]
    pub fn device() -> Self {
        Self::new(vec![
            FieldSpec::new(ENCRYPTION_LEVEL, 1, |v| v <= 2),
            // new fields are appended here, in wire order
        ])
    }

    /// The ordered field specs.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Total record size in bytes.
    #[must_use]
    pub fn total_width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// Decode a raw record into a [`Configuration`].
    ///
    /// The record must be exactly [`total_width`](Self::total_width) bytes.
    /// Each field is consumed as an unsigned big-endian integer of its
    /// declared width and checked against its domain. On any failure the
    /// partially decoded configuration is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LengthMismatch`] on a length mismatch, or
    /// [`ConfigError::InvalidValue`] if a field value is outside its domain.
    #[must_use = "decoding returns a Result that should be handled"]
    pub fn decode(&self, data: &[u8]) -> Result<Configuration, ConfigError> {
        let expected = self.total_width();
        if data.len() != expected {
            return Err(ConfigError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let mut config = Configuration::new();
        for field in &self.fields {
            let value = buf.get_uint(field.width);
            if !field.is_valid(value) {
                return Err(ConfigError::InvalidValue {
                    field: field.name.to_string(),
                    value,
                });
            }
            config.set(field.name, value.to_string());
        }
        Ok(config)
    }

    /// Encode a [`Configuration`] into a raw record.
    ///
    /// Fields are emitted in schema order as unsigned big-endian integers;
    /// the result is exactly [`total_width`](Self::total_width) bytes. Domain
    /// validators are not re-applied here; validation is a decode-time
    /// policy and the map stores whatever the caller put in it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if the configuration lacks a
    /// value for a schema field, or [`ConfigError::ValueNotEncodable`] if a
    /// value does not parse as an unsigned integer fitting the field's width.
    #[must_use = "encoding returns a Result that should be handled"]
    pub fn encode(&self, config: &Configuration) -> Result<Vec<u8>, ConfigError> {
        let mut out = Vec::with_capacity(self.total_width());
        for field in &self.fields {
            let raw = config
                .get(field.name)
                .ok_or_else(|| ConfigError::MissingField {
                    field: field.name.to_string(),
                })?;

            let not_encodable = || ConfigError::ValueNotEncodable {
                field: field.name.to_string(),
                value: raw.to_string(),
                width: field.width,
            };

            let value: u64 = raw.parse().map_err(|_| not_encodable())?;
            if field.width < 8 && value >> (field.width * 8) != 0 {
                return Err(not_encodable());
            }
            out.put_uint(value, field.width);
        }
        Ok(out)
    }
}

/// In-memory device configuration.
///
/// An insertion-ordered mapping from field name to value, where values are
/// the decimal text of unsigned integers. A configuration starts empty (or
/// is produced by [`Schema::decode`]) and is mutated through explicit
/// [`set`](Self::set) / [`remove`](Self::remove) calls. It carries no schema
/// knowledge of its own; see [`Schema`] for the codec and validation policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Configuration {
    entries: Vec<(String, String)>,
}

impl Configuration {
    /// Create a new empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value for `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Insert or overwrite the value for `field`.
    ///
    /// Overwriting keeps the field's original position in iteration order.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Remove `field` and return its value, if it was present.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        let index = self.entries.iter().position(|(name, _)| name == field)?;
        Some(self.entries.remove(index).1)
    }

    /// Field names in insertion order.
    ///
    /// For a freshly decoded configuration this is schema declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of fields currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the configuration holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// Encryption level of a Cella drive.
///
/// Typed view of the [`ENCRYPTION_LEVEL`] field's domain.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new levels in
/// future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[repr(u8)]
pub enum EncryptionLevel {
    /// Data stored in the clear.
    Unencrypted = 0,
    /// Single-factor encryption (drive passphrase only).
    SingleFactor = 1,
    /// Dual-factor encryption (passphrase plus paired phone).
    DualFactor = 2,
}

impl EncryptionLevel {
    /// The decimal text of the level, as stored in a [`Configuration`].
    #[must_use]
    pub fn as_value(&self) -> String {
        (*self as u8).to_string()
    }
}

impl TryFrom<u8> for EncryptionLevel {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EncryptionLevel::Unencrypted),
            1 => Ok(EncryptionLevel::SingleFactor),
            2 => Ok(EncryptionLevel::DualFactor),
            _ => Err(ConfigError::InvalidValue {
                field: ENCRYPTION_LEVEL.to_string(),
                value: u64::from(value),
            }),
        }
    }
}

impl fmt::Display for EncryptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionLevel::Unencrypted => write!(f, "unencrypted"),
            EncryptionLevel::SingleFactor => write!(f, "single-factor"),
            EncryptionLevel::DualFactor => write!(f, "dual-factor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::device()
    }

    // --- decode tests ---

    #[test]
    fn test_decode_valid_levels() {
        for level in 0u8..=2 {
            let config = schema().decode(&[level]).unwrap();
            assert_eq!(config.get(ENCRYPTION_LEVEL), Some(level.to_string().as_str()));
        }
    }

    #[test]
    fn test_decode_rejects_out_of_domain_value() {
        let err = schema().decode(&[3]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                field: ENCRYPTION_LEVEL.to_string(),
                value: 3,
            }
        );
        assert!(!err.is_format());
    }

    #[test]
    fn test_decode_rejects_signed_encodings() {
        // 0xFF is -1 as a signed byte; the unsigned interpretation rejects it.
        let err = schema().decode(&[0xFF]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { value: 255, .. }));
    }

    #[test]
    fn test_decode_empty_record() {
        let err = schema().decode(&[]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LengthMismatch {
                expected: 1,
                actual: 0,
            }
        );
        assert!(err.is_format());
    }

    #[test]
    fn test_decode_oversized_record() {
        let err = schema().decode(&[0, 0]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LengthMismatch {
                expected: 1,
                actual: 2,
            }
        ));
    }

    // --- encode tests ---

    #[test]
    fn test_encode_produces_schema_width_record() {
        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, "2");
        assert_eq!(schema().encode(&config).unwrap(), vec![2]);
    }

    #[test]
    fn test_encode_missing_field() {
        let err = schema().encode(&Configuration::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: ENCRYPTION_LEVEL.to_string(),
            }
        );
        assert!(err.is_format());
    }

    #[test]
    fn test_encode_non_numeric_value() {
        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, "high");
        let err = schema().encode(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValueNotEncodable { .. }));
    }

    #[test]
    fn test_encode_value_too_wide_for_field() {
        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, "256");
        let err = schema().encode(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValueNotEncodable { width: 1, .. }
        ));
    }

    #[test]
    fn test_encode_does_not_apply_domain_validators() {
        // Storage is schema-agnostic; 3 encodes fine and fails on decode.
        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, "3");
        let bytes = schema().encode(&config).unwrap();
        assert_eq!(bytes, vec![3]);
        assert!(schema().decode(&bytes).is_err());
    }

    #[test]
    fn test_round_trip() {
        for level in 0u8..=2 {
            let mut config = Configuration::new();
            config.set(ENCRYPTION_LEVEL, level.to_string());
            let bytes = schema().encode(&config).unwrap();
            assert_eq!(schema().decode(&bytes).unwrap(), config);
        }
    }

    // --- multi-field schema tests ---

    fn wide_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("encryption_level", 1, |v| v <= 2),
            FieldSpec::new("lock_timeout", 2, |_| true),
            FieldSpec::new("serial_suffix", 4, |_| true),
        ])
    }

    #[test]
    fn test_multi_field_layout_is_big_endian_in_schema_order() {
        let config = wide_schema()
            .decode(&[0x01, 0x01, 0x2C, 0x00, 0x00, 0xBE, 0xEF])
            .unwrap();
        assert_eq!(config.get("encryption_level"), Some("1"));
        assert_eq!(config.get("lock_timeout"), Some("300"));
        assert_eq!(config.get("serial_suffix"), Some("48879"));
    }

    #[test]
    fn test_multi_field_round_trip() {
        let mut config = Configuration::new();
        config.set("encryption_level", "2");
        config.set("lock_timeout", "65535");
        config.set("serial_suffix", "4294967295");
        let bytes = wide_schema().encode(&config).unwrap();
        assert_eq!(bytes.len(), wide_schema().total_width());
        assert_eq!(wide_schema().decode(&bytes).unwrap(), config);
    }

    #[test]
    fn test_decoded_field_order_matches_schema_order() {
        let config = wide_schema().decode(&[0, 0, 0, 0, 0, 0, 0]).unwrap();
        let names: Vec<&str> = config.field_names().collect();
        assert_eq!(names, ["encryption_level", "lock_timeout", "serial_suffix"]);
    }

    #[test]
    fn test_validation_failure_discards_partial_result() {
        // Second field invalid: decode must fail, not hand back one field.
        let schema = Schema::new(vec![
            FieldSpec::new("a", 1, |_| true),
            FieldSpec::new("b", 1, |v| v == 0),
        ]);
        assert!(matches!(
            schema.decode(&[1, 7]),
            Err(ConfigError::InvalidValue { value: 7, .. })
        ));
    }

    // --- Configuration map tests ---

    #[test]
    fn test_set_overwrites_in_place() {
        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, "2");
        config.set(ENCRYPTION_LEVEL, "1");
        assert_eq!(config.len(), 1);
        assert_eq!(config.get(ENCRYPTION_LEVEL), Some("1"));
    }

    #[test]
    fn test_get_unknown_field_is_none() {
        let config = Configuration::new();
        assert_eq!(config.get("nonexistent"), None);
    }

    #[test]
    fn test_remove_returns_value() {
        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, "1");
        assert_eq!(config.remove(ENCRYPTION_LEVEL), Some("1".to_string()));
        assert_eq!(config.remove(ENCRYPTION_LEVEL), None);
        assert!(config.is_empty());
    }

    #[test]
    fn test_insertion_order_preserved_across_overwrite() {
        let mut config = Configuration::new();
        config.set("a", "1");
        config.set("b", "2");
        config.set("a", "3");
        let names: Vec<&str> = config.field_names().collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_display() {
        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, "2");
        assert_eq!(config.to_string(), "{encryption_level=2}");
        assert_eq!(Configuration::new().to_string(), "{}");
    }

    // --- EncryptionLevel tests ---

    #[test]
    fn test_encryption_level_try_from() {
        assert_eq!(
            EncryptionLevel::try_from(0),
            Ok(EncryptionLevel::Unencrypted)
        );
        assert_eq!(
            EncryptionLevel::try_from(1),
            Ok(EncryptionLevel::SingleFactor)
        );
        assert_eq!(EncryptionLevel::try_from(2), Ok(EncryptionLevel::DualFactor));
        assert!(EncryptionLevel::try_from(3).is_err());
    }

    #[test]
    fn test_encryption_level_as_value_round_trips_through_config() {
        let mut config = Configuration::new();
        config.set(ENCRYPTION_LEVEL, EncryptionLevel::DualFactor.as_value());
        let bytes = schema().encode(&config).unwrap();
        assert_eq!(bytes, vec![2]);
    }

    #[test]
    fn test_encryption_level_display() {
        assert_eq!(EncryptionLevel::Unencrypted.to_string(), "unencrypted");
        assert_eq!(EncryptionLevel::SingleFactor.to_string(), "single-factor");
        assert_eq!(EncryptionLevel::DualFactor.to_string(), "dual-factor");
    }
}
