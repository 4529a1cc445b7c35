//! Management API URLs, including the secret path prefix Outline issues.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ValueError, ValueResult};

/// Absolute URL of a management API. Only scheme and host are checked; path,
/// query and port are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerUrl {
    raw: String,
    parsed: Url,
}

impl ServerUrl {
    /// Parse and validate a server URL.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] when the input is empty, unparseable, or lacks
    /// a scheme or host.
    pub fn parse(input: &str) -> ValueResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            tracing::debug!("rejected empty server URL");
            return Err(ValueError::Empty { field: "URL" });
        }

        let parsed = Url::parse(trimmed).map_err(|err| {
            tracing::debug!(url = trimmed, error = %err, "rejected server URL");
            match err {
                url::ParseError::RelativeUrlWithoutBase => ValueError::MissingScheme,
                url::ParseError::EmptyHost => ValueError::MissingHost,
                other => ValueError::InvalidUrl {
                    message: other.to_string(),
                },
            }
        })?;

        // `https:///secret` would otherwise normalise to host `secret`.
        let empty_authority = authority(trimmed).is_some_and(str::is_empty);
        if empty_authority || parsed.host_str().is_none_or(str::is_empty) {
            tracing::debug!(url = trimmed, "rejected server URL without host");
            return Err(ValueError::MissingHost);
        }

        Ok(Self {
            raw: trimmed.to_string(),
            parsed,
        })
    }

    /// The URL exactly as it was entered (minus surrounding whitespace).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed form, used when building request URLs.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.parsed
    }
}

fn authority(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}

impl Display for ServerUrl {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.raw)
    }
}

impl FromStr for ServerUrl {
    type Err = ValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl TryFrom<String> for ServerUrl {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ServerUrl> for String {
    fn from(value: ServerUrl) -> Self {
        value.raw
    }
}
