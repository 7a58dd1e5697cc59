//! Actions and the effects they perform.

use serde::{Deserialize, Serialize};

use crate::ids::CourseId;

/// The kinds of action a course view can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Learn,
    Enroll,
    UpgradePlan,
    AddToCart,
    GoToCart,
    BuyNow,
    ToggleWishlist,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Learn => "learn",
            ActionKind::Enroll => "enroll",
            ActionKind::UpgradePlan => "upgrade_plan",
            ActionKind::AddToCart => "add_to_cart",
            ActionKind::GoToCart => "go_to_cart",
            ActionKind::BuyNow => "buy_now",
            ActionKind::ToggleWishlist => "toggle_wishlist",
        }
    }

    /// Check if the action writes to the backend or device store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ActionKind::Enroll | ActionKind::AddToCart | ActionKind::BuyNow | ActionKind::ToggleWishlist
        )
    }
}

/// Where a navigation effect leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum Destination {
    /// The course player.
    Learning {
        course_id: CourseId,
        included_in_plan: bool,
    },
    /// The subscription plans page.
    Plans { plan_name: String },
    /// The cart page.
    Cart,
    /// Checkout for exactly one course.
    Checkout { course_id: CourseId },
}

/// One side effect of executing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Navigate(Destination),
    CreateEnrollment { course_id: CourseId },
    /// Runs only after the preceding effect succeeded.
    RemoveFromCartAndWishlist { course_id: CourseId },
    /// Add to the live cart; a no-op if already present.
    AddToCart { course_id: CourseId },
    AddToWishlist { course_id: CourseId },
    RemoveFromWishlist { course_id: CourseId },
}

/// An offered action with its label and effects, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub label: String,
    pub effects: Vec<Effect>,
}

impl Action {
    pub(crate) fn learn(course_id: &CourseId, included_in_plan: bool) -> Self {
        let label = if included_in_plan {
            "Included in your plan - start learning"
        } else {
            "Go to course"
        };
        Self {
            kind: ActionKind::Learn,
            label: label.to_string(),
            effects: vec![Effect::Navigate(Destination::Learning {
                course_id: course_id.clone(),
                included_in_plan,
            })],
        }
    }

    pub(crate) fn enroll(course_id: &CourseId) -> Self {
        Self {
            kind: ActionKind::Enroll,
            label: "Enroll for free".to_string(),
            effects: vec![
                Effect::CreateEnrollment {
                    course_id: course_id.clone(),
                },
                Effect::RemoveFromCartAndWishlist {
                    course_id: course_id.clone(),
                },
            ],
        }
    }

    pub(crate) fn upgrade(plan_name: &str) -> Self {
        Self {
            kind: ActionKind::UpgradePlan,
            label: format!("Subscribe to {plan_name}"),
            effects: vec![Effect::Navigate(Destination::Plans {
                plan_name: plan_name.to_string(),
            })],
        }
    }

    pub(crate) fn add_to_cart(course_id: &CourseId) -> Self {
        Self {
            kind: ActionKind::AddToCart,
            label: "Add to cart".to_string(),
            effects: vec![Effect::AddToCart {
                course_id: course_id.clone(),
            }],
        }
    }

    pub(crate) fn go_to_cart() -> Self {
        Self {
            kind: ActionKind::GoToCart,
            label: "Go to cart".to_string(),
            effects: vec![Effect::Navigate(Destination::Cart)],
        }
    }

    pub(crate) fn buy_now(course_id: &CourseId) -> Self {
        Self {
            kind: ActionKind::BuyNow,
            label: "Buy now".to_string(),
            effects: vec![
                Effect::AddToCart {
                    course_id: course_id.clone(),
                },
                Effect::Navigate(Destination::Checkout {
                    course_id: course_id.clone(),
                }),
            ],
        }
    }

    pub(crate) fn toggle_wishlist(course_id: &CourseId, in_wishlist: bool) -> Self {
        let course_id = course_id.clone();
        if in_wishlist {
            Self {
                kind: ActionKind::ToggleWishlist,
                label: "Remove from wishlist".to_string(),
                effects: vec![Effect::RemoveFromWishlist { course_id }],
            }
        } else {
            Self {
                kind: ActionKind::ToggleWishlist,
                label: "Add to wishlist".to_string(),
                effects: vec![Effect::AddToWishlist { course_id }],
            }
        }
    }
}
