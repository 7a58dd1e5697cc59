//! Courses the viewer owns.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ids::CourseId;

/// Set of owned course ids. Grows only; nothing in this workspace revokes
/// ownership.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct EnrollmentSet {
    courses: HashSet<CourseId>,
}

impl EnrollmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record ownership. Returns `false` if the course was already owned.
    pub fn insert(&mut self, course_id: CourseId) -> bool {
        self.courses.insert(course_id)
    }

    pub fn contains(&self, course_id: &CourseId) -> bool {
        self.courses.contains(course_id)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseId> {
        self.courses.iter()
    }
}

impl FromIterator<CourseId> for EnrollmentSet {
    fn from_iter<I: IntoIterator<Item = CourseId>>(iter: I) -> Self {
        Self {
            courses: iter.into_iter().collect(),
        }
    }
}

impl Extend<CourseId> for EnrollmentSet {
    fn extend<I: IntoIterator<Item = CourseId>>(&mut self, iter: I) {
        self.courses.extend(iter);
    }
}
