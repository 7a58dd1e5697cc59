//! Data access layer for the course marketplace backend.
//!
//! This crate provides:
//! - `MarketplaceApi` - The REST contract, as a trait so tests can fake it
//! - `HttpMarketplaceApi` - reqwest-backed implementation
//! - `DependencyTag` - Per-endpoint timeout and retry defaults
//! - `RetryPolicy` - Retry strategies
//! - `MarketplaceConfig` - File and environment configuration
//! - Wire records and their lenient decoding

mod api;
mod config;
mod dependency;
mod error;
mod http;
mod retry;
pub mod wire;

pub use api::*;
pub use config::*;
pub use dependency::*;
pub use error::*;
pub use http::*;
pub use retry::*;
pub use wire::EnrollReceipt;
