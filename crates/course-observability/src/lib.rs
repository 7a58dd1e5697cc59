//! Logging infrastructure for the course marketplace.
//!
//! This crate provides:
//! - `LogConfig` - Level and output format, loadable from config files
//! - `init` - Process-wide `tracing` subscriber installation

mod logging;

pub use logging::*;
