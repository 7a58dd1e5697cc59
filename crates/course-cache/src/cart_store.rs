//! Guest cart persistence.

use course_commerce::catalog::CourseStub;
use course_commerce::cart::GuestCart;
use course_commerce::ids::CourseId;
use course_commerce::parse::{parse_with_fallback, Decoded};
use tracing::{debug, warn};

use crate::{Cache, CacheError};

/// Storage key of the guest cart when none is configured.
pub const DEFAULT_GUEST_CART_KEY: &str = "guest_cart";

/// A device-local cart for signed-out viewers.
///
/// `get`, `set` and `clear` are the storage primitives. The other operations
/// are read-modify-write on top of them and keep the list duplicate-free.
pub trait CartStore: Send + Sync {
    /// Load the cart. Unreadable contents load as an empty cart.
    fn get(&self) -> Result<GuestCart, CacheError>;

    /// Replace the stored cart.
    fn set(&self, cart: &GuestCart) -> Result<(), CacheError>;

    /// Remove everything.
    fn clear(&self) -> Result<(), CacheError>;

    /// Append the stubs of `other` not already stored. Returns how many
    /// were added.
    fn merge(&self, other: GuestCart) -> Result<usize, CacheError> {
        let mut cart = self.get()?;
        let added = cart.merge(other);
        if added > 0 {
            self.set(&cart)?;
        }
        Ok(added)
    }

    /// Add one stub. Returns `false` if the course was already stored.
    fn add(&self, stub: CourseStub) -> Result<bool, CacheError> {
        let mut cart = self.get()?;
        let added = cart.add(stub);
        if added {
            self.set(&cart)?;
        }
        Ok(added)
    }

    /// Remove one course. Returns whether it was stored.
    fn remove(&self, course_id: &CourseId) -> Result<bool, CacheError> {
        let mut cart = self.get()?;
        let removed = cart.remove(course_id);
        if removed {
            self.set(&cart)?;
        }
        Ok(removed)
    }

    fn contains(&self, course_id: &CourseId) -> Result<bool, CacheError> {
        Ok(self.get()?.contains(course_id))
    }
}

/// [`CartStore`] keeping the cart as one JSON list under a fixed key.
#[derive(Debug, Clone)]
pub struct GuestCartStore {
    cache: Cache,
    key: String,
}

impl GuestCartStore {
    /// Store under [`DEFAULT_GUEST_CART_KEY`].
    pub fn new(cache: Cache) -> Self {
        Self::with_key(cache, DEFAULT_GUEST_CART_KEY)
    }

    pub fn with_key(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl CartStore for GuestCartStore {
    fn get(&self) -> Result<GuestCart, CacheError> {
        let Some(bytes) = self.cache.get_raw(&self.key)? else {
            return Ok(GuestCart::new());
        };
        let raw = String::from_utf8_lossy(&bytes);
        let decoded: Decoded<Vec<CourseStub>> = parse_with_fallback(&raw);
        if let Some(error) = decoded.error() {
            warn!(key = %self.key, %error, "guest cart unreadable, treating as empty");
        }
        Ok(GuestCart::from_stubs(decoded.into_inner()))
    }

    fn set(&self, cart: &GuestCart) -> Result<(), CacheError> {
        debug!(key = %self.key, items = cart.len(), "saving guest cart");
        self.cache.set(&self.key, cart.items())
    }

    fn clear(&self) -> Result<(), CacheError> {
        debug!(key = %self.key, "clearing guest cart");
        self.cache.delete(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_commerce::money::{Currency, Money};

    fn stub(id: &str) -> CourseStub {
        CourseStub {
            id: CourseId::new(id),
            title: format!("Course {id}"),
            price: Money::new(1500, Currency::USD),
            thumbnail: None,
            instructor_id: None,
            instructor_name: Some("Grace".into()),
        }
    }

    #[test]
    fn test_missing_key_is_empty() {
        let store = GuestCartStore::new(Cache::in_memory());
        assert!(store.get().unwrap().is_empty());
    }

    #[test]
    fn test_add_dedup_and_remove() {
        let store = GuestCartStore::new(Cache::in_memory());
        assert!(store.add(stub("1")).unwrap());
        assert!(!store.add(stub("1")).unwrap());
        assert!(store.add(stub("2")).unwrap());
        assert_eq!(store.get().unwrap().len(), 2);

        assert!(store.remove(&CourseId::new("1")).unwrap());
        assert!(!store.contains(&CourseId::new("1")).unwrap());
        assert!(store.contains(&CourseId::new("2")).unwrap());
    }

    #[test]
    fn test_merge_and_clear() {
        let store = GuestCartStore::new(Cache::in_memory());
        store.add(stub("1")).unwrap();
        let added = store
            .merge(GuestCart::from_stubs([stub("1"), stub("3")]))
            .unwrap();
        assert_eq!(added, 1);

        store.clear().unwrap();
        assert!(store.get().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_payload_reads_as_empty() {
        let cache = Cache::in_memory();
        cache.set(DEFAULT_GUEST_CART_KEY, &"{not a list").unwrap();
        let store = GuestCartStore::new(cache);
        assert!(store.get().unwrap().is_empty());
    }

    #[test]
    fn test_stored_wire_shape() {
        let cache = Cache::in_memory();
        let store = GuestCartStore::with_key(cache.clone(), "cart_v1");
        store.add(stub("42")).unwrap();

        let raw: serde_json::Value = cache.get("cart_v1").unwrap().unwrap();
        assert_eq!(raw[0]["id"], "42");
        assert_eq!(raw[0]["price"], 15.0);
        assert_eq!(raw[0]["instructor_name"], "Grace");
    }

    #[test]
    fn test_reads_legacy_numeric_fields() {
        let cache = Cache::in_memory();
        let legacy = serde_json::json!([
            {"id": 5, "title": "Old", "price": "19.99", "thumbnail": null,
             "instructor_id": 3, "instructor_name": "Lin"}
        ]);
        cache.set(DEFAULT_GUEST_CART_KEY, &legacy).unwrap();

        let cart = GuestCartStore::new(cache).get().unwrap();
        assert_eq!(cart.items()[0].id, CourseId::new("5"));
        assert_eq!(cart.items()[0].price.amount_cents, 1999);
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        GuestCartStore::new(Cache::open_dir(dir.path()).unwrap())
            .add(stub("9"))
            .unwrap();

        let store = GuestCartStore::new(Cache::open_dir(dir.path()).unwrap());
        assert!(store.contains(&CourseId::new("9")).unwrap());
    }
}
