//! Course pricing and access records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, InstructorId, PlanId};
use crate::money::{Currency, Money};
use crate::parse::{timestamp_from_str, BoundSide};

/// A course as seen by the pricing and entitlement resolvers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Display title.
    pub title: String,
    /// List price before any discount. Never negative.
    pub base_price: Money,
    /// Time-windowed discount configuration.
    pub discount: CourseDiscount,
    /// Subscription requirements.
    pub access: CourseAccess,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Instructor reference.
    pub instructor_id: Option<InstructorId>,
    /// Instructor display label.
    pub instructor_name: Option<String>,
}

impl Course {
    /// Create a course with no discount and no plan requirement.
    pub fn new(id: impl Into<CourseId>, title: impl Into<String>, base_price: Money) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            base_price: base_price.non_negative(),
            discount: CourseDiscount::None,
            access: CourseAccess::default(),
            thumbnail: None,
            instructor_id: None,
            instructor_name: None,
        }
    }

    /// Set the discount.
    pub fn with_discount(mut self, discount: CourseDiscount) -> Self {
        self.discount = discount;
        self
    }

    /// Require a subscription plan.
    pub fn subscriber_only(mut self, plan_name: impl Into<String>) -> Self {
        self.access = CourseAccess {
            subscriber_only: true,
            required_plan_name: Some(plan_name.into()),
            plan_id: None,
        };
        self
    }

    /// Set the instructor label.
    pub fn with_instructor(mut self, id: Option<InstructorId>, name: impl Into<String>) -> Self {
        self.instructor_id = id;
        self.instructor_name = Some(name.into());
        self
    }

    /// Check if the list price is zero.
    pub fn is_free(&self) -> bool {
        self.base_price.is_zero()
    }

    pub fn currency(&self) -> Currency {
        self.base_price.currency
    }
}

/// Which subscription, if any, unlocks the course.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseAccess {
    /// The course references a required plan.
    pub subscriber_only: bool,
    /// Human-readable plan name, free text.
    pub required_plan_name: Option<String>,
    /// Plan reference, when the backend sends one.
    pub plan_id: Option<PlanId>,
}

impl CourseAccess {
    /// The required plan name, if present and non-blank.
    pub fn plan_name(&self) -> Option<&str> {
        self.required_plan_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Check if an upsell to a named plan can be offered.
    pub fn has_upsell(&self) -> bool {
        self.subscriber_only && self.plan_name().is_some()
    }
}

/// Discount arithmetic mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Percentage off.
    Percent,
    /// Fixed amount off.
    Fixed,
}

impl DiscountKind {
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "percent" | "percentage" => Some(DiscountKind::Percent),
            "fixed" | "amount" => Some(DiscountKind::Fixed),
            _ => None,
        }
    }
}

/// Inclusive validity window. A missing bound is open on that side.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscountWindow {
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl DiscountWindow {
    /// A window open on both sides.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(starts_at: Option<DateTime<Utc>>, ends_at: Option<DateTime<Utc>>) -> Self {
        Self { starts_at, ends_at }
    }

    /// Check whether `now` lies within the window, both bounds inclusive.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        if let Some(starts) = self.starts_at {
            if now < starts {
                return false;
            }
        }
        if let Some(ends) = self.ends_at {
            if now > ends {
                return false;
            }
        }
        true
    }
}

/// A course's discount configuration after validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CourseDiscount {
    /// No discount configured, or configured but switched off.
    #[default]
    None,
    /// `percent` off the base price.
    Percent { percent: f64, window: DiscountWindow },
    /// `amount` (decimal, course currency) off the base price.
    Fixed { amount: f64, window: DiscountWindow },
    /// Configured but malformed; priced as no discount.
    Invalid { reason: String },
}

/// Raw discount fields exactly as a backend sends them.
#[derive(Debug, Clone, Default)]
pub struct RawDiscount<'a> {
    pub active: bool,
    pub kind: Option<&'a str>,
    pub value: Option<f64>,
    pub starts_at: Option<&'a str>,
    pub ends_at: Option<&'a str>,
}

impl CourseDiscount {
    /// Percentage discount with no window.
    pub fn percent(percent: f64) -> Self {
        CourseDiscount::Percent {
            percent,
            window: DiscountWindow::unbounded(),
        }
    }

    /// Fixed discount with no window.
    pub fn fixed(amount: f64) -> Self {
        CourseDiscount::Fixed {
            amount,
            window: DiscountWindow::unbounded(),
        }
    }

    /// Restrict the discount to a window. No-op for `None`/`Invalid`.
    pub fn within(self, window: DiscountWindow) -> Self {
        match self {
            CourseDiscount::Percent { percent, .. } => CourseDiscount::Percent { percent, window },
            CourseDiscount::Fixed { amount, .. } => CourseDiscount::Fixed { amount, window },
            other => other,
        }
    }

    /// Validate raw discount fields.
    ///
    /// Inactive, untyped, or valueless discounts are `None`. Negative values,
    /// percentages above 100, unknown types and unreadable dates are
    /// `Invalid`.
    pub fn from_raw(raw: RawDiscount<'_>) -> Self {
        if !raw.active {
            return CourseDiscount::None;
        }
        let Some(kind_raw) = raw.kind.map(str::trim).filter(|k| !k.is_empty()) else {
            return CourseDiscount::None;
        };
        let Some(kind) = DiscountKind::from_wire(kind_raw) else {
            return CourseDiscount::Invalid {
                reason: format!("unknown discount type '{kind_raw}'"),
            };
        };
        let Some(value) = raw.value else {
            return CourseDiscount::None;
        };
        if let Some(reason) = validate_value(kind, value) {
            return CourseDiscount::Invalid { reason };
        }

        let starts_at = match raw.starts_at.filter(|s| !s.trim().is_empty()) {
            Some(s) => match timestamp_from_str(s, BoundSide::Start) {
                Ok(ts) => Some(ts),
                Err(e) => return CourseDiscount::Invalid { reason: e.to_string() },
            },
            None => None,
        };
        let ends_at = match raw.ends_at.filter(|s| !s.trim().is_empty()) {
            Some(s) => match timestamp_from_str(s, BoundSide::End) {
                Ok(ts) => Some(ts),
                Err(e) => return CourseDiscount::Invalid { reason: e.to_string() },
            },
            None => None,
        };
        let window = DiscountWindow::new(starts_at, ends_at);

        match kind {
            DiscountKind::Percent => CourseDiscount::Percent {
                percent: value,
                window,
            },
            DiscountKind::Fixed => CourseDiscount::Fixed {
                amount: value,
                window,
            },
        }
    }

    pub fn kind(&self) -> Option<DiscountKind> {
        match self {
            CourseDiscount::Percent { .. } => Some(DiscountKind::Percent),
            CourseDiscount::Fixed { .. } => Some(DiscountKind::Fixed),
            CourseDiscount::None | CourseDiscount::Invalid { .. } => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, CourseDiscount::Invalid { .. })
    }
}

/// Reason a discount value is unusable, if any.
pub(crate) fn validate_value(kind: DiscountKind, value: f64) -> Option<String> {
    if !value.is_finite() {
        return Some("discount value is not finite".to_string());
    }
    if value < 0.0 {
        return Some(format!("negative discount value {value}"));
    }
    if kind == DiscountKind::Percent && value > 100.0 {
        return Some(format!("percentage {value} exceeds 100"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(kind: &'static str, value: f64) -> RawDiscount<'static> {
        RawDiscount {
            active: true,
            kind: Some(kind),
            value: Some(value),
            starts_at: None,
            ends_at: None,
        }
    }

    #[test]
    fn test_inactive_discount_is_none() {
        let discount = CourseDiscount::from_raw(RawDiscount {
            active: false,
            ..raw("percent", 20.0)
        });
        assert_eq!(discount, CourseDiscount::None);
    }

    #[test]
    fn test_missing_value_is_none() {
        let discount = CourseDiscount::from_raw(RawDiscount {
            value: None,
            ..raw("fixed", 0.0)
        });
        assert_eq!(discount, CourseDiscount::None);
    }

    #[test]
    fn test_unknown_type_is_invalid() {
        assert!(CourseDiscount::from_raw(raw("bogo", 10.0)).is_invalid());
    }

    #[test]
    fn test_negative_and_oversized_values_are_invalid() {
        assert!(CourseDiscount::from_raw(raw("fixed", -5.0)).is_invalid());
        assert!(CourseDiscount::from_raw(raw("percent", 120.0)).is_invalid());
        assert!(!CourseDiscount::from_raw(raw("fixed", 500.0)).is_invalid());
    }

    #[test]
    fn test_unparseable_date_is_invalid() {
        let discount = CourseDiscount::from_raw(RawDiscount {
            starts_at: Some("soon"),
            ..raw("percent", 10.0)
        });
        assert!(discount.is_invalid());
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let window = DiscountWindow::new(Some(start), Some(end));

        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(start - chrono::Duration::seconds(1)));
        assert!(!window.contains(end + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_open_window_contains_everything() {
        let now = Utc::now();
        assert!(DiscountWindow::unbounded().contains(now));
        assert!(DiscountWindow::new(None, Some(now)).contains(now));
    }

    #[test]
    fn test_blank_plan_name_has_no_upsell() {
        let access = CourseAccess {
            subscriber_only: true,
            required_plan_name: Some("   ".to_string()),
            plan_id: None,
        };
        assert!(!access.has_upsell());
    }
}
