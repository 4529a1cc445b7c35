//! Command handlers.

pub(crate) mod keys;
pub(crate) mod servers;
