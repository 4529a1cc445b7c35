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

//! Local registry of Outline servers.
//!
//! Layout: `registry.rs` (YAML-backed `ServerRegistry`), `error.rs`
//! (`ConfigError`).

pub mod error;
pub mod registry;

pub use error::{ConfigError, ConfigResult};
pub use registry::{ServerEntry, ServerRegistry};
