//! Device-local cart for signed-out viewers.

use serde::{Deserialize, Serialize};

use crate::catalog::CourseStub;
use crate::ids::CourseId;
use crate::money::{Currency, Money};

/// Ordered list of course stubs. A course appears at most once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct GuestCart {
    items: Vec<CourseStub>,
}

impl GuestCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored stubs, dropping repeated ids but keeping the first
    /// occurrence's position.
    pub fn from_stubs(stubs: impl IntoIterator<Item = CourseStub>) -> Self {
        let mut cart = Self::new();
        for stub in stubs {
            cart.add(stub);
        }
        cart
    }

    /// Append a stub. Returns `false`, leaving the cart untouched, if the
    /// course is already present.
    pub fn add(&mut self, stub: CourseStub) -> bool {
        if self.contains(&stub.id) {
            return false;
        }
        self.items.push(stub);
        true
    }

    /// Remove a course. Returns whether it was present.
    pub fn remove(&mut self, course_id: &CourseId) -> bool {
        let before = self.items.len();
        self.items.retain(|s| &s.id != course_id);
        self.items.len() != before
    }

    pub fn contains(&self, course_id: &CourseId) -> bool {
        self.items.iter().any(|s| &s.id == course_id)
    }

    /// Append every stub from `other` not already present.
    pub fn merge(&mut self, other: GuestCart) -> usize {
        let mut added = 0;
        for stub in other.items {
            if self.add(stub) {
                added += 1;
            }
        }
        added
    }

    pub fn items(&self) -> &[CourseStub] {
        &self.items
    }

    pub fn course_ids(&self) -> impl Iterator<Item = &CourseId> {
        self.items.iter().map(|s| &s.id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_items(self) -> Vec<CourseStub> {
        self.items
    }

    /// Sum of the shown prices. `None` on overflow or mixed currencies.
    pub fn total(&self, currency: Currency) -> Option<Money> {
        Money::try_sum(self.items.iter().map(|s| &s.price), currency)
    }
}

impl FromIterator<CourseStub> for GuestCart {
    fn from_iter<I: IntoIterator<Item = CourseStub>>(iter: I) -> Self {
        Self::from_stubs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(id: &str, cents: i64) -> CourseStub {
        CourseStub {
            id: CourseId::new(id),
            title: format!("Course {id}"),
            price: Money::new(cents, Currency::USD),
            thumbnail: None,
            instructor_id: None,
            instructor_name: None,
        }
    }

    #[test]
    fn test_add_is_deduplicated() {
        let mut cart = GuestCart::new();
        assert!(cart.add(stub("1", 1000)));
        assert!(!cart.add(stub("1", 900)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].price.amount_cents, 1000);
    }

    #[test]
    fn test_order_is_preserved() {
        let cart: GuestCart = vec![stub("b", 1), stub("a", 2), stub("b", 3)]
            .into_iter()
            .collect();
        let ids: Vec<&str> = cart.course_ids().map(CourseId::as_str).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_merge_skips_present() {
        let mut cart = GuestCart::from_stubs([stub("1", 100)]);
        let added = cart.merge(GuestCart::from_stubs([stub("1", 100), stub("2", 200)]));
        assert_eq!(added, 1);
        assert_eq!(cart.total(Currency::USD), Some(Money::new(300, Currency::USD)));
    }

    #[test]
    fn test_remove() {
        let mut cart = GuestCart::from_stubs([stub("1", 100)]);
        assert!(cart.remove(&CourseId::new("1")));
        assert!(!cart.remove(&CourseId::new("1")));
        assert!(cart.is_empty());
    }
}
