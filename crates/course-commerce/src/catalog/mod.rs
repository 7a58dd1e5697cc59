//! Course catalog module.
//!
//! Contains the course pricing/access record and the minimal stub kept in a
//! guest cart.

pub(crate) mod course;
mod stub;

pub use course::{
    Course, CourseAccess, CourseDiscount, DiscountKind, DiscountWindow, RawDiscount,
};
pub use stub::CourseStub;
