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

//! Logging setup for the Outline command line.
//!
//! Layout: `init.rs` (verbosity, format and dispatch construction), `error.rs`
//! (flag parsing failures).

pub mod error;
pub mod init;

pub use error::{TelemetryError, TelemetryResult};
pub use init::{DEFAULT_VERBOSITY, LogFormat, LoggingConfig, Verbosity, build_dispatch};
