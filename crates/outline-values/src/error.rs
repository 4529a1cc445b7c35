//! Rejection reasons raised by the value parsers.

use thiserror::Error;

/// Result alias for value parsing.
pub type ValueResult<T> = Result<T, ValueError>;

/// Structured errors emitted when text cannot be turned into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Input was empty (after trimming) where a value is required.
    #[error("{field} cannot be empty")]
    Empty {
        /// Human-readable name of the value being parsed.
        field: &'static str,
    },

    /// Data size did not start with a number.
    #[error("invalid data size format. Expected format like '1GB', '500MB', '2TB'. Got: {input}")]
    MalformedSize {
        /// Offending input.
        input: String,
    },

    /// Data size carried a unit suffix outside the supported set.
    #[error("unknown data size unit '{unit}' in '{input}'")]
    UnknownUnit {
        /// Offending input.
        input: String,
        /// Unit suffix that was not recognised.
        unit: String,
    },

    /// Data size magnitude was negative.
    #[error("data size cannot be negative: {input}")]
    NegativeSize {
        /// Offending input.
        input: String,
    },

    /// Data size does not fit in 64 bits.
    #[error("data size is too large: {input}")]
    SizeOverflow {
        /// Offending input.
        input: String,
    },

    /// URL text could not be parsed at all.
    #[error("invalid URL format: {message}")]
    InvalidUrl {
        /// Parser diagnostic.
        message: String,
    },

    /// URL lacked a scheme.
    #[error("URL must include a scheme (e.g., https://)")]
    MissingScheme,

    /// URL lacked a host.
    #[error("URL must include a host")]
    MissingHost,

    /// Certificate fingerprint was not valid hexadecimal.
    #[error("invalid SHA256 hash format: {message}")]
    InvalidFingerprint {
        /// Decoder diagnostic.
        message: String,
    },

    /// Port was not an integer.
    #[error("invalid port number: {input}")]
    InvalidPort {
        /// Offending input.
        input: String,
    },

    /// Port was an integer outside `1..=65535`.
    #[error("port must be between 1 and 65535, got: {value}")]
    PortOutOfRange {
        /// Parsed value.
        value: i64,
    },

    /// Encryption method was not one of the supported ciphers.
    #[error("invalid encryption method '{input}'. Valid methods are: {valid}")]
    UnknownEncryptionMethod {
        /// Offending input.
        input: String,
        /// Comma separated list of accepted methods.
        valid: String,
    },
}
