//! Subscription snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point-in-time read of the viewer's subscription. Never mutated locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionSnapshot {
    pub has_active_subscription: bool,
    /// Plan name, free text.
    pub plan_name: String,
    pub features: PlanFeatures,
}

/// Plan capabilities. Only `all_courses_access` is interpreted; the rest is
/// kept for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanFeatures {
    #[serde(default, alias = "allCoursesAccess", deserialize_with = "lenient_flag")]
    pub all_courses_access: bool,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl SubscriptionSnapshot {
    /// A snapshot for a viewer with no subscription.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// An active subscription to `plan_name`.
    pub fn active(plan_name: impl Into<String>) -> Self {
        Self {
            has_active_subscription: true,
            plan_name: plan_name.into(),
            features: PlanFeatures::default(),
        }
    }

    /// Grant access to every course.
    pub fn with_all_courses_access(mut self) -> Self {
        self.features.all_courses_access = true;
        self
    }

    /// Check whether this subscription unlocks a course requiring
    /// `required_plan_name`. Both names must be non-blank to match.
    pub fn covers(&self, required_plan_name: Option<&str>) -> bool {
        if !self.has_active_subscription {
            return false;
        }
        if self.features.all_courses_access {
            return true;
        }
        let ours = normalize_plan_name(&self.plan_name);
        let theirs = required_plan_name.map(normalize_plan_name).unwrap_or_default();
        !ours.is_empty() && !theirs.is_empty() && ours == theirs
    }
}

fn lenient_flag<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(crate::parse::flag_from_value(&value).into_inner())
}

/// Trim and lowercase a plan name for comparison.
pub fn normalize_plan_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_never_covers() {
        let mut snapshot = SubscriptionSnapshot::inactive().with_all_courses_access();
        snapshot.plan_name = "Pro".into();
        assert!(!snapshot.covers(Some("Pro")));
    }

    #[test]
    fn test_name_match_is_trimmed_and_case_insensitive() {
        let snapshot = SubscriptionSnapshot::active("  Pro Annual ");
        assert!(snapshot.covers(Some("pro annual")));
        assert!(!snapshot.covers(Some("Pro")));
    }

    #[test]
    fn test_blank_names_never_match() {
        let snapshot = SubscriptionSnapshot::active("   ");
        assert!(!snapshot.covers(Some("  ")));
        assert!(!snapshot.covers(None));
    }

    #[test]
    fn test_all_courses_access_covers_anything() {
        let snapshot = SubscriptionSnapshot::active("Basic").with_all_courses_access();
        assert!(snapshot.covers(None));
        assert!(snapshot.covers(Some("Enterprise")));
    }

    #[test]
    fn test_features_keep_unknown_keys() {
        let features: PlanFeatures =
            serde_json::from_str(r#"{"all_courses_access": true, "certificates": true}"#).unwrap();
        assert!(features.all_courses_access);
        assert_eq!(features.other.get("certificates"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_features_accept_numeric_flag() {
        let features: PlanFeatures = serde_json::from_str(r#"{"all_courses_access": 1}"#).unwrap();
        assert!(features.all_courses_access);
    }
}
