//! Wire records for the marketplace REST API.
//!
//! Backends disagree on envelopes and field types, so every record keeps
//! loosely typed fields as raw JSON and decodes them with the fallback
//! helpers from `course_commerce::parse`.

use course_commerce::catalog::{Course, CourseAccess, CourseDiscount, RawDiscount};
use course_commerce::entitlement::{EnrollmentSet, PlanFeatures, SubscriptionSnapshot};
use course_commerce::ids::{CourseId, InstructorId, PlanId};
use course_commerce::money::{Currency, Money};
use course_commerce::parse::{decimal_from_value, decode_embedded, flag_from_value, Decoded, ParseError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Strip a `{"data": ...}` envelope, if there is one.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// A course as `GET /courses/{id}` returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRecord {
    pub id: CourseId,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub discount_active: Value,
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub discount_value: Value,
    #[serde(default)]
    pub discount_starts_at: Option<String>,
    #[serde(default)]
    pub discount_ends_at: Option<String>,
    #[serde(default)]
    pub required_plan_name: Option<String>,
    #[serde(default)]
    pub is_premium: Value,
    #[serde(default)]
    pub is_subscriber_only: Value,
    #[serde(default)]
    pub plan_id: Option<PlanId>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub instructor_id: Option<InstructorId>,
    #[serde(default)]
    pub instructor_name: Option<String>,
}

impl CourseRecord {
    /// Convert to the domain course, pricing in `currency`.
    ///
    /// An unreadable price becomes zero. An unreadable discount value makes
    /// the discount invalid, which prices as no discount.
    pub fn into_course(self, currency: Currency) -> Course {
        let price = decimal_from_value(&self.price);
        if let Some(error) = price.error() {
            warn!(course_id = %self.id, %error, "unreadable course price, using 0");
        }
        let base = price.into_inner().unwrap_or(0.0).max(0.0);

        let active = flag_from_value(&self.discount_active).into_inner();
        let discount = match decimal_from_value(&self.discount_value) {
            Decoded::Fallback { error, .. } if active => {
                warn!(course_id = %self.id, %error, "unreadable discount value");
                CourseDiscount::Invalid {
                    reason: error.to_string(),
                }
            }
            decoded => CourseDiscount::from_raw(RawDiscount {
                active,
                kind: self.discount_type.as_deref(),
                value: decoded.into_inner(),
                starts_at: self.discount_starts_at.as_deref(),
                ends_at: self.discount_ends_at.as_deref(),
            }),
        };
        if let CourseDiscount::Invalid { reason } = &discount {
            warn!(course_id = %self.id, %reason, "invalid discount configuration ignored");
        }

        let named_plan = self
            .required_plan_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        let subscriber_only = self.plan_id.is_some()
            || named_plan
            || flag_from_value(&self.is_subscriber_only).into_inner()
            || flag_from_value(&self.is_premium).into_inner();

        Course {
            id: self.id,
            title: self.title,
            base_price: Money::from_decimal(base, currency),
            discount,
            access: CourseAccess {
                subscriber_only,
                required_plan_name: self.required_plan_name,
                plan_id: self.plan_id,
            },
            thumbnail: self.thumbnail,
            instructor_id: self.instructor_id,
            instructor_name: self.instructor_name,
        }
    }
}

/// The subscription overview as `GET /subscription/overview` returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionRecord {
    #[serde(default, rename = "hasActiveSubscription", alias = "has_active_subscription")]
    pub has_active_subscription: Value,
    #[serde(default, rename = "planName", alias = "plan_name")]
    pub plan_name: Option<String>,
    /// An object, or the same object JSON-encoded as a string.
    #[serde(default)]
    pub features: Value,
}

impl SubscriptionRecord {
    pub fn into_snapshot(self) -> SubscriptionSnapshot {
        let features: Decoded<PlanFeatures> = decode_embedded(&self.features);
        if let Some(error) = features.error() {
            warn!(%error, "unreadable plan features, treating as none");
        }
        SubscriptionSnapshot {
            has_active_subscription: flag_from_value(&self.has_active_subscription).into_inner(),
            plan_name: self.plan_name.unwrap_or_default(),
            features: features.into_inner(),
        }
    }
}

/// Body of `POST /courses/{id}/enroll`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollRecord {
    #[serde(default)]
    pub success: Value,
    #[serde(default)]
    pub enrollments_count: Value,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of an enroll request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollReceipt {
    pub success: bool,
    pub enrollments_count: Option<u64>,
    /// Server-provided explanation, shown when `success` is false.
    pub message: Option<String>,
}

impl From<EnrollRecord> for EnrollReceipt {
    fn from(record: EnrollRecord) -> Self {
        let count = decimal_from_value(&record.enrollments_count)
            .into_inner()
            .filter(|n| *n >= 0.0)
            .map(|n| n as u64);
        Self {
            success: flag_from_value(&record.success).into_inner(),
            enrollments_count: count,
            message: record.message,
        }
    }
}

/// Body sent to add a course to the cart or wishlist.
#[derive(Debug, Clone, Serialize)]
pub struct CourseRef<'a> {
    pub course_id: &'a CourseId,
}

/// Read the course ids out of a cart, wishlist or enrollment listing.
///
/// Accepts a bare array or an object holding one under `items`, `courses`,
/// `enrollments` or `wishlist`. Entries may be plain ids or objects with
/// `course_id`, `courseId`, `course.id` or `id`. Entries without an id are
/// skipped.
pub fn course_ids(value: &Value) -> Decoded<Vec<CourseId>> {
    let entries = match value {
        Value::Null => return Decoded::Parsed(Vec::new()),
        Value::Array(entries) => entries,
        Value::Object(map) => {
            match ["items", "courses", "enrollments", "wishlist"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array))
            {
                Some(entries) => entries,
                None => {
                    return Decoded::Fallback {
                        value: Vec::new(),
                        error: ParseError::UnexpectedType("object without a course list".into()),
                    }
                }
            }
        }
        other => {
            return Decoded::Fallback {
                value: Vec::new(),
                error: ParseError::UnexpectedType(other.to_string()),
            }
        }
    };

    let mut ids: Vec<CourseId> = Vec::with_capacity(entries.len());
    for id in entries.iter().filter_map(entry_course_id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Decoded::Parsed(ids)
}

fn entry_course_id(entry: &Value) -> Option<CourseId> {
    match entry {
        Value::Object(map) => map
            .get("course_id")
            .or_else(|| map.get("courseId"))
            .or_else(|| map.get("course").and_then(|c| c.get("id")))
            .or_else(|| map.get("id"))
            .and_then(scalar_id),
        other => scalar_id(other),
    }
}

fn scalar_id(value: &Value) -> Option<CourseId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(CourseId::new(s.trim())),
        Value::Number(n) => Some(CourseId::new(n.to_string())),
        _ => None,
    }
}

/// Enrollment listing as a set of owned courses.
pub fn enrollment_set(value: &Value) -> Decoded<EnrollmentSet> {
    course_ids(value).map(|ids| ids.into_iter().collect())
}
