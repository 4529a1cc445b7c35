//! Wire models for the management API.
//!
//! Field names follow the server's camelCase JSON. Decoding is lenient: absent
//! fields fall back to their defaults and unknown fields are ignored.

use std::collections::BTreeMap;

use outline_values::{DataSize, EncryptionMethod, Port};
use serde::{Deserialize, Serialize};

/// Byte quota attached to a server default or an access key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLimit {
    /// Quota in bytes.
    pub bytes: u64,
}

impl From<DataSize> for DataLimit {
    fn from(size: DataSize) -> Self {
        Self {
            bytes: size.bytes(),
        }
    }
}

impl From<DataLimit> for DataSize {
    fn from(limit: DataLimit) -> Self {
        Self::from_bytes(limit.bytes)
    }
}

/// Response of `GET /server`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerInfo {
    /// Display name.
    pub name: String,
    /// Server identifier.
    pub server_id: String,
    /// Whether usage metrics are shared.
    pub metrics_enabled: bool,
    /// Creation time in Unix milliseconds.
    pub created_timestamp_ms: i64,
    /// Server software version.
    pub version: String,
    /// Port assigned to newly created keys.
    pub port_for_new_access_keys: u16,
    /// Host name embedded in access URLs.
    pub hostname_for_access_keys: String,
    /// Server-wide default quota, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_data_limit: Option<DataLimit>,
}

/// One access key as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessKey {
    /// Server-assigned identifier.
    pub id: String,
    /// Human-readable name; may be empty.
    pub name: String,
    /// Shadowsocks password.
    pub password: String,
    /// Listening port.
    pub port: u16,
    /// Cipher name. Kept as text since servers may report ciphers this
    /// client cannot request.
    pub method: String,
    /// `ss://` URL handed to clients.
    pub access_url: String,
    /// Per-key quota, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<DataLimit>,
}

/// Response of `GET /access-keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessKeysResponse {
    /// Keys in server order.
    pub access_keys: Vec<AccessKey>,
}

/// Body of `POST /access-keys`. Unset fields are omitted so the server
/// applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateAccessKeyRequest {
    /// Key name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Cipher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<EncryptionMethod>,
    /// Explicit password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Explicit port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
    /// Initial quota.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<DataLimit>,
}

impl CreateAccessKeyRequest {
    /// Request carrying only non-empty values. Empty strings and zero-sized
    /// limits are treated as unset.
    #[must_use]
    pub fn new(
        name: &str,
        method: Option<EncryptionMethod>,
        password: &str,
        port: Option<Port>,
        limit: Option<DataSize>,
    ) -> Self {
        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
        Self {
            name: non_empty(name),
            method,
            password: non_empty(password),
            port,
            limit: limit.filter(|size| !size.is_unset()).map(DataLimit::from),
        }
    }
}

/// Response of `GET /metrics/transfer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferMetrics {
    /// Bytes transferred per access key id, ordered by id.
    pub bytes_transferred_by_user_id: BTreeMap<String, u64>,
}

impl TransferMetrics {
    /// Sum over all keys, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_transferred_by_user_id
            .values()
            .fold(0_u64, |total, bytes| total.saturating_add(*bytes))
    }
}

/// First key whose name equals `name` exactly.
#[must_use]
pub fn find_key_by_name<'a>(keys: &'a [AccessKey], name: &str) -> Option<&'a AccessKey> {
    keys.iter().find(|key| key.name == name)
}
