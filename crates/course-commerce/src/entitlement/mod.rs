//! Access resolution.
//!
//! Decides what a viewer may do with a course from their identity,
//! subscription snapshot and enrollments.

mod enrollment;
mod resolver;
mod subscription;
mod viewer;

pub use enrollment::EnrollmentSet;
pub use resolver::{resolve_entitlement, AccessVerdict, Entitlement};
pub use subscription::{normalize_plan_name, PlanFeatures, SubscriptionSnapshot};
pub use viewer::Viewer;
