//! Photoreel - incremental HLS slideshows from a folder of screenshots
//!
//! This library crate exposes the album builder for the CLI and for
//! integration testing.

pub mod config;
pub mod discovery;
pub mod freshness;
pub mod orchestrator;
pub mod render;

pub use orchestrator::{Orchestrator, PriorSource, RunOutcome};
