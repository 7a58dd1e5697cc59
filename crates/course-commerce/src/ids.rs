//! Newtype IDs for type-safe identifiers.
//!
//! Backends are inconsistent about whether ids are JSON numbers or strings,
//! so every id deserializes from either and is kept as a string.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

/// Wire form of an id: either a JSON string or a JSON integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        }
    }
}

define_id!(CourseId);
define_id!(UserId);
define_id!(PlanId);
define_id!(InstructorId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = CourseId::new("course-123");
        assert_eq!(id.as_str(), "course-123");
    }

    #[test]
    fn test_id_from_number() {
        let id: CourseId = serde_json::from_str("42").unwrap();
        assert_eq!(id, CourseId::new("42"));

        let id: CourseId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id, CourseId::from(42u64));
    }

    #[test]
    fn test_id_serializes_as_string() {
        let json = serde_json::to_string(&UserId::new("u-7")).unwrap();
        assert_eq!(json, "\"u-7\"");
    }

    #[test]
    fn test_id_equality() {
        let id1 = CourseId::new("same");
        let id2 = CourseId::new("same");
        let id3 = CourseId::new("different");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }
}
