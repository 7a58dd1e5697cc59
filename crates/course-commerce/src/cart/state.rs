//! Which cart is authoritative.

use serde::{Deserialize, Serialize};

use crate::cart::GuestCart;
use crate::ids::CourseId;

/// Ordered, duplicate-free list of course ids mirrored from the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CourseList {
    ids: Vec<CourseId>,
}

impl CourseList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the id was already listed.
    pub fn insert(&mut self, course_id: CourseId) -> bool {
        if self.contains(&course_id) {
            return false;
        }
        self.ids.push(course_id);
        true
    }

    pub fn remove(&mut self, course_id: &CourseId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != course_id);
        self.ids.len() != before
    }

    pub fn contains(&self, course_id: &CourseId) -> bool {
        self.ids.contains(course_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<CourseId> for CourseList {
    fn from_iter<I: IntoIterator<Item = CourseId>>(iter: I) -> Self {
        let mut list = Self::new();
        for id in iter {
            list.insert(id);
        }
        list
    }
}

/// The live cart. Exactly one variant is authoritative at a time, selected
/// by whether a viewer is signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CartState {
    Guest { items: GuestCart },
    Remote { courses: CourseList },
}

impl Default for CartState {
    fn default() -> Self {
        CartState::Guest {
            items: GuestCart::new(),
        }
    }
}

impl CartState {
    pub fn contains(&self, course_id: &CourseId) -> bool {
        match self {
            CartState::Guest { items } => items.contains(course_id),
            CartState::Remote { courses } => courses.contains(course_id),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CartState::Guest { items } => items.len(),
            CartState::Remote { courses } => courses.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, CartState::Remote { .. })
    }

    /// Drop a course from whichever cart is live.
    pub fn remove(&mut self, course_id: &CourseId) -> bool {
        match self {
            CartState::Guest { items } => items.remove(course_id),
            CartState::Remote { courses } => courses.remove(course_id),
        }
    }
}

/// Remote wishlist. There is no guest wishlist, so `Unavailable` stands for
/// a signed-out viewer and for a wishlist fetch that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WishlistState {
    #[default]
    Unavailable,
    Loaded { courses: CourseList },
}

impl WishlistState {
    pub fn loaded(courses: impl IntoIterator<Item = CourseId>) -> Self {
        WishlistState::Loaded {
            courses: courses.into_iter().collect(),
        }
    }

    pub fn contains(&self, course_id: &CourseId) -> bool {
        match self {
            WishlistState::Unavailable => false,
            WishlistState::Loaded { courses } => courses.contains(course_id),
        }
    }

    pub fn insert(&mut self, course_id: CourseId) -> bool {
        match self {
            WishlistState::Unavailable => {
                *self = WishlistState::loaded([course_id]);
                true
            }
            WishlistState::Loaded { courses } => courses.insert(course_id),
        }
    }

    pub fn remove(&mut self, course_id: &CourseId) -> bool {
        match self {
            WishlistState::Unavailable => false,
            WishlistState::Loaded { courses } => courses.remove(course_id),
        }
    }
}
