//! The person looking at a course.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A viewer is either a guest or a signed-in member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewer {
    /// Not signed in.
    #[default]
    Guest,
    /// Signed in.
    Member {
        /// User ID.
        id: UserId,
        /// Display name.
        name: Option<String>,
    },
}

impl Viewer {
    /// Create a signed-in viewer.
    pub fn member(id: impl Into<UserId>) -> Self {
        Viewer::Member {
            id: id.into(),
            name: None,
        }
    }

    /// Check if viewer is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Member { .. })
    }

    /// Get user ID if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Viewer::Member { id, .. } => Some(id),
            Viewer::Guest => None,
        }
    }
}
