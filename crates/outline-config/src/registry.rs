//! YAML-backed registry of known servers.
//!
//! # Design
//! - One document, `servers: { <name>: { name, url, certSha256 } }`, ordered by
//!   name so rewrites are stable.
//! - A missing file is an empty registry; the file and its directory appear on
//!   the first mutation.
//! - Every mutation is written back before the call returns.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use outline_values::{CertFingerprint, ServerUrl};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

const CONFIG_DIR: &str = ".config/outline-cli";
const CONFIG_FILE: &str = "config.yaml";

/// A registered server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Registry name.
    pub name: String,
    /// Management API URL including its secret prefix.
    pub url: ServerUrl,
    /// Pinned certificate fingerprint.
    #[serde(rename = "certSha256")]
    pub cert_sha256: CertFingerprint,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    servers: Option<BTreeMap<String, ServerEntry>>,
}

#[derive(Debug, Deserialize)]
struct InstallerBlob {
    #[serde(rename = "apiUrl", default)]
    api_url: String,
    #[serde(rename = "certSha256", default)]
    cert_sha256: String,
}

/// Server registry bound to one file.
#[derive(Debug, Clone)]
pub struct ServerRegistry {
    path: PathBuf,
    servers: BTreeMap<String, ServerEntry>,
}

impl ServerRegistry {
    /// `$HOME/.config/outline-cli/config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HomeDirUnavailable`] when no home directory can
    /// be resolved.
    pub fn default_path() -> ConfigResult<PathBuf> {
        let dirs = BaseDirs::new().ok_or(ConfigError::HomeDirUnavailable)?;
        Ok(dirs.home_dir().join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the registry stored at `path`, or an empty one if the file does
    /// not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file does not exist");
            return Ok(Self {
                path,
                servers: BTreeMap::new(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| {
            tracing::error!(path = %path.display(), error = %source, "failed to read config file");
            ConfigError::Io {
                action: "read",
                path: path.clone(),
                source,
            }
        })?;

        let servers = if contents.trim().is_empty() {
            tracing::debug!(path = %path.display(), "config file is empty");
            BTreeMap::new()
        } else {
            let document: RegistryDocument = serde_yaml::from_str(&contents).map_err(|source| {
                tracing::error!(
                    path = %path.display(),
                    error = %source,
                    "failed to parse config file"
                );
                ConfigError::Yaml {
                    path: path.clone(),
                    source,
                }
            })?;
            document.servers.unwrap_or_default()
        };

        tracing::debug!(path = %path.display(), servers = servers.len(), "loaded server registry");
        Ok(Self { path, servers })
    }

    /// File backing this registry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ServerNotFound`] for unknown names.
    pub fn lookup(&self, name: &str) -> ConfigResult<&ServerEntry> {
        self.servers.get(name).ok_or_else(|| {
            tracing::error!(name, "server not found");
            ConfigError::ServerNotFound {
                name: name.to_string(),
            }
        })
    }

    /// All entries ordered by name.
    pub fn list_all(&self) -> impl ExactSizeIterator<Item = (&str, &ServerEntry)> {
        self.servers
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Register a new server and persist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ServerExists`] when `name` is taken, or an I/O
    /// error if the file cannot be written.
    pub fn add(
        &mut self,
        name: &str,
        url: ServerUrl,
        cert_sha256: CertFingerprint,
    ) -> ConfigResult<()> {
        if self.servers.contains_key(name) {
            tracing::error!(name, "server already exists");
            return Err(ConfigError::ServerExists {
                name: name.to_string(),
            });
        }

        self.upsert(name, url, cert_sha256)?;
        tracing::info!(name, "server added");
        Ok(())
    }

    /// Insert or replace the entry for `name` and persist. Returns whether
    /// an existing entry was replaced.
    ///
    /// # Errors
    ///
    /// Returns an I/O or YAML error if the file cannot be written.
    pub fn upsert(
        &mut self,
        name: &str,
        url: ServerUrl,
        cert_sha256: CertFingerprint,
    ) -> ConfigResult<bool> {
        let mut servers = self.servers.clone();
        let replaced = servers
            .insert(
                name.to_string(),
                ServerEntry {
                    name: name.to_string(),
                    url,
                    cert_sha256,
                },
            )
            .is_some();
        self.commit(servers)?;
        tracing::debug!(name, replaced, "server entry stored");
        Ok(replaced)
    }

    /// Register a server from the `{"apiUrl": ..., "certSha256": ...}` blob
    /// printed by the Outline installer.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, missing or invalid fields, or any
    /// failure of [`ServerRegistry::add`].
    pub fn add_from_json(&mut self, name: &str, json: &str) -> ConfigResult<()> {
        let blob: InstallerBlob = serde_json::from_str(json).map_err(|source| {
            tracing::error!(error = %source, "failed to parse installer JSON");
            ConfigError::InvalidJson { source }
        })?;
        if blob.api_url.is_empty() {
            return Err(ConfigError::MissingJsonField { field: "apiUrl" });
        }
        if blob.cert_sha256.is_empty() {
            return Err(ConfigError::MissingJsonField { field: "certSha256" });
        }

        let url = ServerUrl::parse(&blob.api_url)?;
        let cert_sha256 = CertFingerprint::parse(&blob.cert_sha256)?;
        self.add(name, url, cert_sha256)
    }

    /// Replace the URL of an existing server and persist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ServerNotFound`] for unknown names, or an I/O
    /// error if the file cannot be written.
    pub fn update_url(&mut self, name: &str, url: ServerUrl) -> ConfigResult<()> {
        let mut servers = self.servers.clone();
        let entry = servers.get_mut(name).ok_or_else(|| {
            tracing::error!(name, "server not found");
            ConfigError::ServerNotFound {
                name: name.to_string(),
            }
        })?;
        tracing::debug!(name, "updating server URL");
        entry.url = url;
        self.commit(servers)?;
        tracing::info!(name, "server updated");
        Ok(())
    }

    /// Remove a server and persist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ServerNotFound`] for unknown names, or an I/O
    /// error if the file cannot be written.
    pub fn delete(&mut self, name: &str) -> ConfigResult<()> {
        let mut servers = self.servers.clone();
        if servers.remove(name).is_none() {
            tracing::error!(name, "server not found");
            return Err(ConfigError::ServerNotFound {
                name: name.to_string(),
            });
        }
        self.commit(servers)?;
        tracing::info!(name, "server deleted");
        Ok(())
    }

    /// Render the registry exactly as it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if serialization fails.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        self.render(&self.servers)
    }

    fn render(&self, servers: &BTreeMap<String, ServerEntry>) -> ConfigResult<String> {
        let document = RegistryDocument {
            servers: Some(servers.clone()),
        };
        serde_yaml::to_string(&document).map_err(|source| ConfigError::Yaml {
            path: self.path.clone(),
            source,
        })
    }

    /// Write `servers` to disk, then adopt them. A failed write leaves the
    /// in-memory registry unchanged.
    fn commit(&mut self, servers: BTreeMap<String, ServerEntry>) -> ConfigResult<()> {
        let rendered = self.render(&servers)?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                action: "create",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, rendered).map_err(|source| {
            tracing::error!(
                path = %self.path.display(),
                error = %source,
                "failed to write config file"
            );
            ConfigError::Io {
                action: "write",
                path: self.path.clone(),
                source,
            }
        })?;
        self.servers = servers;
        tracing::debug!(path = %self.path.display(), "saved server registry");
        Ok(())
    }
}
