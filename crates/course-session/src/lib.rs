//! Course view sessions.
//!
//! This crate ties the pure resolvers to live backend state:
//! - `CourseViewLoader` - Concurrent course and status fetches, readiness and staleness
//! - `CartWishlistCoordinator` - Guest and remote cart, wishlist, login merge, enrollment
//! - `CourseView` - A resolved snapshot with its price, verdict and actions
//! - `StatusBoard` / `ViewStatus` - Per-view fetch tracking
//! - `Marketplace` - All of the above wired from a `MarketplaceConfig`

mod coordinator;
mod loader;
mod marketplace;
mod status;
mod view;

pub use coordinator::*;
pub use loader::*;
pub use marketplace::*;
pub use status::*;
pub use view::*;

pub use course_cache;
pub use course_commerce;
pub use course_data;
pub use course_observability;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ActionReport, CartWishlistCoordinator, CourseView, CourseViewLoader, LoadOutcome,
        Marketplace, MergeReport, ViewStatus, WishlistChange,
    };
    pub use course_cache::prelude::*;
    pub use course_commerce::prelude::*;
    pub use course_data::{AddOutcome, MarketplaceApi, MarketplaceConfig};
}
