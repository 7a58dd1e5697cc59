//! Price resolution.
//!
//! Contains the per-course price resolver and cart-level totals.

mod resolver;
mod summary;

pub use resolver::{resolve_price, resolve_price_now, PriceResult};
pub use summary::{CartSummary, LinePricing};
