//! Minimal course stub persisted in a guest cart.

use serde::{Deserialize, Serialize};

use crate::catalog::Course;
use crate::ids::{CourseId, InstructorId};
use crate::money::Money;

/// The fields a guest cart keeps per course. Serialized in the device-local
/// wire shape: `{id, title, price, thumbnail, instructor_id, instructor_name}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseStub {
    pub id: CourseId,
    #[serde(default)]
    pub title: String,
    /// Price shown when the stub was added, as a decimal.
    #[serde(with = "crate::money::decimal", default)]
    pub price: Money,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub instructor_id: Option<InstructorId>,
    #[serde(default)]
    pub instructor_name: Option<String>,
}

impl CourseStub {
    /// Build a stub from a course and the price the user was shown.
    pub fn from_course(course: &Course, shown_price: Money) -> Self {
        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            price: shown_price,
            thumbnail: course.thumbnail.clone(),
            instructor_id: course.instructor_id.clone(),
            instructor_name: course.instructor_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_stub_wire_shape() {
        let course = Course::new("12", "Rust for Web", Money::new(4999, Currency::USD))
            .with_instructor(Some(InstructorId::new("7")), "Ada");
        let stub = CourseStub::from_course(&course, course.base_price);
        let json = serde_json::to_value(&stub).unwrap();

        assert_eq!(json["id"], "12");
        assert_eq!(json["price"], 49.99);
        assert_eq!(json["instructor_name"], "Ada");
    }

    #[test]
    fn test_stub_reads_numeric_id_and_string_price() {
        let stub: CourseStub =
            serde_json::from_str(r#"{"id": 3, "title": "Go", "price": "19.50"}"#).unwrap();
        assert_eq!(stub.id, CourseId::new("3"));
        assert_eq!(stub.price.amount_cents, 1950);
        assert!(stub.thumbnail.is_none());
    }
}
