//! TCP ports for new access keys.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};

/// A port in `1..=65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Parse a decimal port number.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] for empty input, non-integer text (including
    /// decimals), and integers outside `1..=65535`.
    pub fn parse(input: &str) -> ValueResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            tracing::debug!("rejected empty port");
            return Err(ValueError::Empty { field: "port" });
        }

        let value: i64 = trimmed.parse().map_err(|err| {
            tracing::debug!(port = trimmed, error = %err, "rejected port");
            ValueError::InvalidPort {
                input: trimmed.to_string(),
            }
        })?;

        u16::try_from(value)
            .ok()
            .filter(|port| *port != 0)
            .map(Self)
            .ok_or_else(|| {
                tracing::debug!(port = value, "port out of range");
                ValueError::PortOutOfRange { value }
            })
    }

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl Display for Port {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for Port {
    type Err = ValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl TryFrom<u16> for Port {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(ValueError::PortOutOfRange { value: 0 });
        }
        Ok(Self(value))
    }
}

impl From<Port> for u16 {
    fn from(value: Port) -> Self {
        value.0
    }
}
