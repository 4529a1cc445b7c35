//! Error types for management API calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for management API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures raised while talking to a management API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL cannot carry path segments.
    #[error("invalid base URL '{url}'")]
    InvalidBaseUrl {
        /// Offending base URL.
        url: String,
    },
    /// The pinned TLS configuration could not be assembled.
    #[error("failed to configure pinned TLS")]
    TlsConfig {
        /// Underlying rustls error.
        source: rustls::Error,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuild {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// DNS, connect, TLS (including pin mismatches) or timeout failure.
    #[error("request to {operation} failed")]
    Transport {
        /// Operation label, e.g. `GET /server`.
        operation: &'static str,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The server answered with a status other than the documented one.
    #[error("{operation} returned status {status}: {body}")]
    UnexpectedStatus {
        /// Operation label.
        operation: &'static str,
        /// Status returned by the server.
        status: StatusCode,
        /// Response body, verbatim.
        body: String,
    },
    /// A success response could not be decoded.
    #[error("failed to decode {operation} response")]
    Decode {
        /// Operation label.
        operation: &'static str,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Status code for [`ApiError::UnexpectedStatus`].
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
