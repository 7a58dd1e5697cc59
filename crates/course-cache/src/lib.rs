//! Type-safe key-value store for the course marketplace.
//!
//! Provides JSON-serialized values over a pluggable byte store, and the
//! device-local guest cart built on top of it.
//!
//! # Example
//!
//! ```rust
//! use course_cache::{Cache, CartStore, GuestCartStore, MemoryStore};
//! use course_commerce::prelude::*;
//!
//! let cache = Cache::new(MemoryStore::new());
//! let store = GuestCartStore::new(cache);
//!
//! let course = Course::new("7", "Rust Basics", Money::new(1999, Currency::USD));
//! store.add(CourseStub::from_course(&course, course.base_price))?;
//! assert!(store.contains(&course.id)?);
//!
//! store.clear()?;
//! assert!(store.get()?.is_empty());
//! # Ok::<(), course_cache::CacheError>(())
//! ```

mod cart_store;
mod error;
mod kv;

pub use cart_store::{CartStore, GuestCartStore, DEFAULT_GUEST_CART_KEY};
pub use error::CacheError;
pub use kv::{Cache, FileStore, KvStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, CartStore, GuestCartStore, KvStore, MemoryStore};
}
