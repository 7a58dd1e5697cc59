//! Entitlement precedence.

use serde::{Deserialize, Serialize};

use crate::catalog::Course;
use crate::entitlement::{EnrollmentSet, SubscriptionSnapshot, Viewer};

/// The access verdict for one viewer against one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entitlement {
    /// List price is zero.
    Free,
    /// The viewer is enrolled.
    Owned,
    /// The viewer's subscription includes the course.
    SubscriptionCovered,
    /// The viewer must buy or subscribe.
    Locked,
}

impl Entitlement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entitlement::Free => "free",
            Entitlement::Owned => "owned",
            Entitlement::SubscriptionCovered => "subscription_covered",
            Entitlement::Locked => "locked",
        }
    }

    /// Check if the viewer can open the learning view right now.
    pub fn can_learn(&self) -> bool {
        matches!(self, Entitlement::Owned | Entitlement::SubscriptionCovered)
    }
}

/// Entitlement plus the plan to upsell when the course is locked behind one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessVerdict {
    pub entitlement: Entitlement,
    /// Set only for `Locked` subscriber-only courses with a named plan.
    pub upsell_plan: Option<String>,
}

/// Resolve the viewer's entitlement to `course`.
///
/// Precedence is fixed: free, then owned, then subscription, then locked.
/// A missing subscription snapshot (not loaded, or the fetch failed) never
/// grants access.
pub fn resolve_entitlement(
    course: &Course,
    viewer: &Viewer,
    subscription: Option<&SubscriptionSnapshot>,
    enrollments: &EnrollmentSet,
) -> AccessVerdict {
    let entitlement = if course.base_price.amount_cents <= 0 {
        Entitlement::Free
    } else if viewer.is_authenticated() && enrollments.contains(&course.id) {
        Entitlement::Owned
    } else if viewer.is_authenticated()
        && subscription.is_some_and(|s| s.covers(course.access.required_plan_name.as_deref()))
    {
        Entitlement::SubscriptionCovered
    } else {
        Entitlement::Locked
    };

    let upsell_plan = match entitlement {
        Entitlement::Locked if course.access.has_upsell() => {
            course.access.plan_name().map(str::to_string)
        }
        _ => None,
    };

    AccessVerdict {
        entitlement,
        upsell_plan,
    }
}
