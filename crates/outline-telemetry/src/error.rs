//! Error types for logging configuration.

use thiserror::Error;

/// Result alias for telemetry helpers.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Rejected logging options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    /// Verbosity outside `error`, `warning`, `info`, `debug`.
    #[error("unknown verbosity '{input}' (expected error, warning, info or debug)")]
    UnknownVerbosity {
        /// Rejected input.
        input: String,
    },
    /// Format outside `text`, `json`.
    #[error("unknown log format '{input}' (expected text or json)")]
    UnknownFormat {
        /// Rejected input.
        input: String,
    },
}
