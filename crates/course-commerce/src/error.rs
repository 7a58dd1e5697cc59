//! Commerce error types.
//!
//! Nothing in this workspace is fatal to the host application. Every error
//! maps to a [`Notice`] that a UI can show, or to nothing when the failure
//! is silent, such as a status fetch falling back to its default.

use serde::Serialize;
use thiserror::Error;

use crate::parse::ParseError;

/// Errors that can occur in marketplace operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// A backend request failed or timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed configuration or input data.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    /// A field could not be decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Entitlement state has not settled yet.
    #[error("Course view is not ready")]
    NotReady,

    /// The requested action is not offered for this course.
    #[error("Action not available: {0}")]
    ActionUnavailable(String),

    /// The wishlist cannot be changed for an owned course.
    #[error("Wishlist is disabled for owned courses")]
    WishlistDisabled,

    /// The operation needs a signed-in user.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The device-local store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// What an operation conflicted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    AlreadyInCart,
    AlreadyInWishlist,
    AlreadyOwned,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::AlreadyInCart => write!(f, "course is already in the cart"),
            ConflictKind::AlreadyInWishlist => write!(f, "course is already in the wishlist"),
            ConflictKind::AlreadyOwned => write!(f, "course is already owned"),
        }
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A non-fatal, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl CommerceError {
    /// The notice a UI should show for this error.
    ///
    /// Parse and validation failures are resolved to safe defaults before
    /// they reach a user, so they produce no notice.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            CommerceError::Network(_) => Some(Notice::error(
                "We couldn't reach the server. Please try again.",
            )),
            CommerceError::Conflict(kind) => Some(Notice::info(capitalize(&kind.to_string()))),
            CommerceError::NotReady => Some(Notice::info("Still loading, one moment.")),
            CommerceError::ActionUnavailable(_) => {
                Some(Notice::warning("That action isn't available for this course."))
            }
            CommerceError::WishlistDisabled => {
                Some(Notice::info("You already own this course."))
            }
            CommerceError::AuthenticationRequired => {
                Some(Notice::info("Please sign in to continue."))
            }
            CommerceError::Storage(_) => Some(Notice::warning(
                "Your cart couldn't be saved on this device.",
            )),
            CommerceError::Validation(_) | CommerceError::Parse(_) => None,
        }
    }

    /// Check if this is a conflict with existing state.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CommerceError::Conflict(_))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_notice_is_info() {
        let notice = CommerceError::Conflict(ConflictKind::AlreadyInWishlist)
            .notice()
            .unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.message, "Course is already in the wishlist");
    }

    #[test]
    fn test_parse_errors_are_silent() {
        let err = CommerceError::from(ParseError::Json("eof".to_string()));
        assert!(err.notice().is_none());
    }

    #[test]
    fn test_network_notice_is_error_level() {
        let notice = CommerceError::Network("timeout".into()).notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
    }
}
