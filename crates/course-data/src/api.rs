//! The marketplace REST contract.

use async_trait::async_trait;
use course_commerce::catalog::Course;
use course_commerce::entitlement::{EnrollmentSet, SubscriptionSnapshot};
use course_commerce::ids::CourseId;

use crate::wire::EnrollReceipt;
use crate::FetchError;

/// Result of adding a course to a remote list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The course was already listed. Not an error.
    AlreadyPresent,
}

/// Backend operations a course view needs. Calls run as the viewer the
/// implementation was built for.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    async fn fetch_course(&self, course_id: &CourseId) -> Result<Course, FetchError>;

    async fn fetch_enrollments(&self) -> Result<EnrollmentSet, FetchError>;

    async fn fetch_wishlist(&self) -> Result<Vec<CourseId>, FetchError>;

    async fn fetch_subscription(&self) -> Result<SubscriptionSnapshot, FetchError>;

    async fn fetch_cart(&self) -> Result<Vec<CourseId>, FetchError>;

    /// Add to the remote cart. Adding a listed course is `AlreadyPresent`.
    async fn add_to_cart(&self, course_id: &CourseId) -> Result<AddOutcome, FetchError>;

    async fn remove_from_cart(&self, course_id: &CourseId) -> Result<(), FetchError>;

    /// Add to the wishlist. Adding a listed course is `AlreadyPresent`.
    async fn add_to_wishlist(&self, course_id: &CourseId) -> Result<AddOutcome, FetchError>;

    async fn remove_from_wishlist(&self, course_id: &CourseId) -> Result<(), FetchError>;

    async fn enroll(&self, course_id: &CourseId) -> Result<EnrollReceipt, FetchError>;
}
