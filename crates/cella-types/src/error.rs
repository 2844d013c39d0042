//! Error types for the configuration codec in cella-types.

use thiserror::Error;

/// Errors that can occur when encoding or decoding a configuration record.
///
/// Variants fall into two families. Format errors (`LengthMismatch`,
/// `MissingField`, `ValueNotEncodable`) mean the record or configuration
/// does not match the schema's layout. Validation errors (`InvalidValue`)
/// mean a well-formed field carries a value outside its declared domain.
/// All failures are deterministic and surfaced immediately; none should be
/// retried.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Record length does not match the schema's total width.
    #[error("invalid record length: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Total width of the schema in bytes.
        expected: usize,
        /// Length of the record that was provided.
        actual: usize,
    },

    /// A schema field has no value in the configuration being encoded.
    #[error("missing value for field '{field}'")]
    MissingField {
        /// Name of the absent field.
        field: String,
    },

    /// A value cannot be encoded as an unsigned integer of the field's width.
    #[error("value '{value}' for field '{field}' does not fit in {width} byte(s)")]
    ValueNotEncodable {
        /// Name of the field being encoded.
        field: String,
        /// The stored value that failed to encode.
        value: String,
        /// Declared byte width of the field.
        width: usize,
    },

    /// A decoded field value is outside the field's declared domain.
    #[error("invalid value for field '{field}': {value}")]
    InvalidValue {
        /// Name of the field that failed validation.
        field: String,
        /// The decoded value that was rejected.
        value: u64,
    },
}

impl ConfigError {
    /// Whether this error describes a layout problem rather than a
    /// domain violation.
    #[must_use]
    pub fn is_format(&self) -> bool {
        !matches!(self, ConfigError::InvalidValue { .. })
    }
}

/// Result type alias using cella-types' [`ConfigError`] type.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
