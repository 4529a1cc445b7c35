//! Logging configuration and dispatch construction.
//!
//! # Design
//! - Builds a `Dispatch` instead of installing a global subscriber; callers
//!   scope it around the work they want logged.
//! - `RUST_LOG` takes precedence over the verbosity flag when it parses.
//! - Output goes to standard error so command output stays machine-readable.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt as subscriber_fmt, layer::SubscriberExt};

use crate::error::{TelemetryError, TelemetryResult};

/// Verbosity used when none is given.
pub const DEFAULT_VERBOSITY: Verbosity = Verbosity::Info;

/// Minimum severity that reaches the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warning,
    /// Progress messages.
    #[default]
    Info,
    /// Request-level detail.
    Debug,
}

impl Verbosity {
    /// Directive understood by [`EnvFilter`].
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Name accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Parse a command-line verbosity. Empty input selects the default.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::UnknownVerbosity`] for any other name.
    pub fn parse(input: &str) -> TelemetryResult<Self> {
        match input.trim() {
            "" => Ok(DEFAULT_VERBOSITY),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(TelemetryError::UnknownVerbosity {
                input: other.to_string(),
            }),
        }
    }
}

impl Display for Verbosity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = TelemetryError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// `key=value` text lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Name accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(TelemetryError::UnknownFormat {
                input: other.to_string(),
            }),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum severity.
    pub verbosity: Verbosity,
    /// Line format.
    pub format: LogFormat,
}

/// Build a dispatch writing to standard error.
#[must_use]
pub fn build_dispatch(config: &LoggingConfig) -> Dispatch {
    dispatch_with_writer(build_env_filter(config.verbosity), config.format, std::io::stderr)
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.as_filter()))
}

fn dispatch_with_writer<W>(filter: EnvFilter, format: LogFormat, writer: W) -> Dispatch
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => Dispatch::new(
            tracing_subscriber::registry().with(filter).with(
                subscriber_fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Text => Dispatch::new(
            tracing_subscriber::registry().with(filter).with(
                subscriber_fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(writer),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            self.0
                .lock()
                .map(|buffer| String::from_utf8_lossy(&buffer).into_owned())
                .unwrap_or_default()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .map_err(|_| io::Error::other("poisoned"))?
                .extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'writer> MakeWriter<'writer> for Captured {
        type Writer = Self;

        fn make_writer(&'writer self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(verbosity: Verbosity, format: LogFormat) -> (Dispatch, Captured) {
        let captured = Captured::default();
        let dispatch = dispatch_with_writer(
            EnvFilter::new(verbosity.as_filter()),
            format,
            captured.clone(),
        );
        (dispatch, captured)
    }

    #[test]
    fn verbosity_parses_flag_names() -> TelemetryResult<()> {
        assert_eq!(Verbosity::parse("error")?, Verbosity::Error);
        assert_eq!(Verbosity::parse("warning")?, Verbosity::Warning);
        assert_eq!(Verbosity::parse("")?, Verbosity::Info);
        assert_eq!("debug".parse::<Verbosity>()?, Verbosity::Debug);
        assert_eq!(
            Verbosity::parse("trace"),
            Err(TelemetryError::UnknownVerbosity {
                input: "trace".to_string()
            })
        );
        assert_eq!(Verbosity::Warning.as_filter(), "warn");
        Ok(())
    }

    #[test]
    fn log_format_parses_flag_names() -> TelemetryResult<()> {
        assert_eq!("text".parse::<LogFormat>()?, LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>()?, LogFormat::Json);
        assert!("pretty".parse::<LogFormat>().is_err());
        Ok(())
    }

    #[test]
    fn verbosity_filters_lower_levels() {
        let (dispatch, captured) = capture(Verbosity::Warning, LogFormat::Text);
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!("progress message");
            tracing::warn!("careful now");
        });

        let output = captured.contents();
        assert!(output.contains("careful now"), "{output}");
        assert!(!output.contains("progress message"), "{output}");
    }

    #[test]
    fn json_format_emits_one_object_per_line() -> Result<(), serde_json::Error> {
        let (dispatch, captured) = capture(Verbosity::Debug, LogFormat::Json);
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!(operation = "GET /server", "sending request");
        });

        let output = captured.contents();
        let line = output.lines().next().unwrap_or_default();
        let event: serde_json::Value = serde_json::from_str(line)?;
        assert_eq!(event["level"], "DEBUG");
        assert_eq!(event["fields"]["message"], "sending request");
        assert_eq!(event["fields"]["operation"], "GET /server");
        Ok(())
    }

    #[test]
    fn dispatch_is_scoped() {
        let (dispatch, captured) = capture(Verbosity::Info, LogFormat::Text);
        tracing::dispatcher::with_default(&dispatch, || tracing::info!("inside"));
        tracing::info!("outside");

        let output = captured.contents();
        assert!(output.contains("inside"));
        assert!(!output.contains("outside"));
    }
}
