//! Shadowsocks ciphers accepted by the management API.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};

/// Cipher used by an access key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionMethod {
    /// `aes-256-gcm`
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    /// `aes-192-gcm`, used when nothing is specified.
    #[default]
    #[serde(rename = "aes-192-gcm")]
    Aes192Gcm,
    /// `aes-128-gcm`
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    /// `chacha20-poly1305`
    #[serde(rename = "chacha20-poly1305")]
    Chacha20Poly1305,
}

impl EncryptionMethod {
    /// Every supported method, in display order.
    pub const ALL: [Self; 4] = [
        Self::Aes256Gcm,
        Self::Aes192Gcm,
        Self::Aes128Gcm,
        Self::Chacha20Poly1305,
    ];

    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aes256Gcm => "aes-256-gcm",
            Self::Aes192Gcm => "aes-192-gcm",
            Self::Aes128Gcm => "aes-128-gcm",
            Self::Chacha20Poly1305 => "chacha20-poly1305",
        }
    }

    /// Parse a method name. Matching is exact and case-sensitive; empty
    /// input selects the default.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnknownEncryptionMethod`] listing the valid names.
    pub fn parse(input: &str) -> ValueResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == trimmed)
            .ok_or_else(|| {
                let valid = Self::ALL.map(Self::as_str).join(", ");
                tracing::debug!(
                    method = trimmed,
                    valid_methods = %valid,
                    "rejected encryption method"
                );
                ValueError::UnknownEncryptionMethod {
                    input: trimmed.to_string(),
                    valid,
                }
            })
    }
}

impl Display for EncryptionMethod {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for EncryptionMethod {
    type Err = ValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}
