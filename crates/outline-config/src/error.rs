//! Error types for the server registry.

use std::io;
use std::path::PathBuf;

use outline_values::ValueError;
use thiserror::Error;

/// Result alias for registry operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures raised while reading or changing the registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A server with this name is already registered.
    #[error("server '{name}' already exists")]
    ServerExists {
        /// Conflicting name.
        name: String,
    },
    /// No server with this name is registered.
    #[error("server '{name}' not found")]
    ServerNotFound {
        /// Requested name.
        name: String,
    },
    /// The installer JSON lacks a required field.
    #[error("{field} is required in JSON")]
    MissingJsonField {
        /// Missing field name.
        field: &'static str,
    },
    /// The installer JSON could not be parsed.
    #[error("invalid JSON format")]
    InvalidJson {
        /// Underlying parser error.
        source: serde_json::Error,
    },
    /// Filesystem access failed.
    #[error("failed to {action} {}", .path.display())]
    Io {
        /// Operation attempted, e.g. `read`.
        action: &'static str,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The registry document could not be parsed or rendered.
    #[error("invalid registry document {}", .path.display())]
    Yaml {
        /// Registry file.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// A URL or fingerprint failed validation.
    #[error(transparent)]
    Value(#[from] ValueError),
    /// The home directory could not be determined.
    #[error("unable to determine the home directory")]
    HomeDirUnavailable,
}

impl ConfigError {
    /// Whether the error reports a missing server.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ServerNotFound { .. })
    }
}
