//! reel-core: shared error type and configuration.
//!
//! This crate is the foundational dependency for the other reel-* crates,
//! providing the fatal [`Error`] taxonomy used by a run and the explicit
//! [`config::Config`] value that is handed to the orchestrator.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
