//! Dependency tagging for backend endpoints.

use std::time::Duration;

/// Timeout applied to status fetches when nothing is configured.
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_millis(8000);

/// The backend resources a course view depends on.
///
/// Each tag carries a default timeout and retry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// The course record.
    Course,
    /// The viewer's enrollments.
    Enrollments,
    /// The viewer's wishlist.
    Wishlist,
    /// The viewer's subscription overview.
    Subscription,
    /// The viewer's remote cart.
    Cart,
    /// Enrollment creation.
    Enroll,
}

impl DependencyTag {
    /// The four per-viewer status fetches a course view waits on.
    pub const STATUS: [DependencyTag; 4] = [
        DependencyTag::Enrollments,
        DependencyTag::Wishlist,
        DependencyTag::Subscription,
        DependencyTag::Cart,
    ];

    /// Get the default timeout for this dependency.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Enroll => Duration::from_millis(10_000),
            _ => DEFAULT_STATUS_TIMEOUT,
        }
    }

    /// Get the default max retries for reads of this dependency.
    pub fn default_max_retries(&self) -> u32 {
        match self {
            Self::Course => 2,
            Self::Enroll => 0,
            _ => 1,
        }
    }

    /// Check if a failure of this dependency fails the whole view.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Course)
    }

    /// Check if this is one of the four status fetches.
    pub fn is_status(&self) -> bool {
        Self::STATUS.contains(self)
    }

    /// Get the name of this dependency.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Enrollments => "enrollments",
            Self::Wishlist => "wishlist",
            Self::Subscription => "subscription",
            Self::Cart => "cart",
            Self::Enroll => "enroll",
        }
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
