//! Certificate fingerprints used to pin self-signed management API servers.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};

/// Hex-encoded SHA-256 digest of a DER certificate, as printed by the Outline
/// installer (`certSha256`). Case is preserved; comparisons ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertFingerprint(String);

impl CertFingerprint {
    /// Parse a hexadecimal fingerprint.
    ///
    /// Any non-empty, even-length hex string is accepted; the length is not
    /// pinned to 64 characters here.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] when the input is empty or not valid hex.
    pub fn parse(input: &str) -> ValueResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            tracing::debug!("rejected empty certificate fingerprint");
            return Err(ValueError::Empty {
                field: "certificate SHA256",
            });
        }

        hex::decode(trimmed).map_err(|err| {
            tracing::debug!(hash = trimmed, error = %err, "rejected certificate fingerprint");
            ValueError::InvalidFingerprint {
                message: err.to_string(),
            }
        })?;

        Ok(Self(trimmed.to_string()))
    }

    /// The fingerprint as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form used for byte-for-byte comparison.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_ascii_uppercase()
    }

    /// Whether `digest` encodes to this fingerprint, ignoring case.
    #[must_use]
    pub fn matches_digest(&self, digest: &[u8]) -> bool {
        hex::encode_upper(digest) == self.normalized()
    }
}

impl Display for CertFingerprint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for CertFingerprint {
    type Err = ValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl TryFrom<String> for CertFingerprint {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CertFingerprint> for String {
    fn from(value: CertFingerprint) -> Self {
        value.0
    }
}
