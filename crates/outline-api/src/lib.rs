#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Client for the Outline server management API.
//!
//! Layout: `tls.rs` (certificate-pinned HTTPS transport), `models.rs` (wire
//! payloads), `client.rs` (`OutlineClient` operations), `error.rs`
//! (`ApiError`).

pub mod client;
pub mod error;
pub mod models;
pub mod tls;

pub use client::OutlineClient;
pub use error::{ApiError, ApiResult};
pub use models::{
    AccessKey, AccessKeysResponse, CreateAccessKeyRequest, DataLimit, ServerInfo, TransferMetrics,
    find_key_by_name,
};
pub use tls::{CertificatePin, PinError, PinnedCertVerifier, REQUEST_TIMEOUT, pinned_http_client};
