//! CLI error type, exit codes, and the context shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use anyhow::anyhow;
use outline_api::{ApiError, OutlineClient};
use outline_config::{ConfigError, ServerRegistry};
use outline_values::ValueError;

use crate::cli::ServerArgs;

/// CLI-level error type separating bad input, missing things and
/// operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    NotFound(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::NotFound(_) => 4,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::NotFound(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

impl From<ValueError> for CliError {
    fn from(error: ValueError) -> Self {
        Self::validation(error.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::ServerNotFound { .. } => Self::not_found(error.to_string()),
            ConfigError::ServerExists { .. }
            | ConfigError::MissingJsonField { .. }
            | ConfigError::Value(_) => Self::validation(error.to_string()),
            ConfigError::InvalidJson { ref source } => {
                Self::validation(format!("invalid JSON format: {source}"))
            }
            other => Self::failure(other),
        }
    }
}

impl From<ApiError> for CliError {
    fn from(error: ApiError) -> Self {
        Self::failure(error)
    }
}

/// Application context passed to command handlers.
#[derive(Debug)]
pub(crate) struct AppContext {
    pub(crate) registry: ServerRegistry,
}

impl AppContext {
    /// Load the registry from `config`, or from the per-user default path.
    pub(crate) fn open(config: Option<PathBuf>) -> CliResult<Self> {
        let path = match config {
            Some(path) => path,
            None => ServerRegistry::default_path()
                .map_err(|err| CliError::failure(anyhow!("cannot locate config file: {err}")))?,
        };
        let registry = ServerRegistry::open(path)?;
        Ok(Self { registry })
    }

    /// Pinned API client for the server named in `server`.
    pub(crate) fn client_for(&self, server: &ServerArgs) -> CliResult<OutlineClient> {
        let entry = self.registry.lookup(&server.server_name)?;
        Ok(OutlineClient::new(&entry.url, &entry.cert_sha256)?)
    }
}
