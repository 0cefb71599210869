//! # Error Handling
//!
//! Error kinds surfaced by listener reconciliation. Every variant carries its
//! originating cause; nothing is retried or swallowed inside the crate.

pub mod types;

pub use types::{Error, ErrorKind, Result};
