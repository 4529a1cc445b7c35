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

//! Validated value types shared by the command line and the server registry.
//!
//! Layout: `size.rs` (human data sizes), `server_url.rs` (management API
//! URLs), `fingerprint.rs` (certificate SHA-256 pins), `port.rs` (TCP ports),
//! `method.rs` (Shadowsocks ciphers), `error.rs` (shared rejection reasons).
//!
//! Every type parses through a named `parse` constructor, renders through
//! `Display`, and (de)serializes through the same pair so YAML and JSON
//! documents get identical validation.

pub mod error;
pub mod fingerprint;
pub mod method;
pub mod port;
pub mod server_url;
pub mod size;

pub use error::{ValueError, ValueResult};
pub use fingerprint::CertFingerprint;
pub use method::EncryptionMethod;
pub use port::Port;
pub use server_url::ServerUrl;
pub use size::DataSize;
