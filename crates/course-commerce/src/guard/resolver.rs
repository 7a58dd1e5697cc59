//! Action table.

use serde::Serialize;

use crate::entitlement::{AccessVerdict, Entitlement};
use crate::error::CommerceError;
use crate::guard::{Action, ActionKind};
use crate::ids::CourseId;

/// Everything the guard needs to know about one course view.
#[derive(Debug, Clone, Copy)]
pub struct GuardInput<'a> {
    pub course_id: &'a CourseId,
    pub verdict: &'a AccessVerdict,
    /// The course is in the live cart (guest or remote).
    pub in_cart: bool,
    pub in_wishlist: bool,
    /// The viewer is enrolled, whatever the entitlement says.
    pub owned: bool,
    /// All status fetches for this course have settled.
    pub ready: bool,
}

/// State of the wishlist control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WishlistControl {
    /// Not offered.
    Hidden,
    /// Shown but inert.
    Disabled,
    Available { in_wishlist: bool },
}

/// The actions offered for a course view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSet {
    pub entitlement: Entitlement,
    pub primary: Action,
    pub secondary: Vec<Action>,
    pub wishlist: WishlistControl,
    pub ready: bool,
}

impl ActionSet {
    /// Every offered action, primary first.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }

    /// Check if `kind` is offered, ignoring readiness.
    pub fn offers(&self, kind: ActionKind) -> bool {
        self.actions().any(|a| a.kind == kind)
    }

    /// Gate an action. Nothing runs before the view is ready, and the
    /// wishlist of an owned course can't be changed.
    pub fn permit(&self, kind: ActionKind) -> Result<&Action, CommerceError> {
        if !self.ready {
            return Err(CommerceError::NotReady);
        }
        if kind == ActionKind::ToggleWishlist && self.wishlist == WishlistControl::Disabled {
            return Err(CommerceError::WishlistDisabled);
        }
        self.actions()
            .find(|a| a.kind == kind)
            .ok_or_else(|| CommerceError::ActionUnavailable(kind.as_str().to_string()))
    }
}

/// Build the action set for a course view.
pub fn resolve_actions(input: GuardInput<'_>) -> ActionSet {
    let id = input.course_id;
    let wishlist_toggle = || Action::toggle_wishlist(id, input.in_wishlist);
    let cart_action = || {
        if input.in_cart {
            Action::go_to_cart()
        } else {
            Action::add_to_cart(id)
        }
    };

    let (primary, secondary, wishlist) = match input.verdict.entitlement {
        Entitlement::Owned => (Action::learn(id, false), Vec::new(), WishlistControl::Disabled),
        Entitlement::Free if input.owned => {
            (Action::learn(id, false), Vec::new(), WishlistControl::Disabled)
        }
        Entitlement::Free => (Action::enroll(id), Vec::new(), WishlistControl::Hidden),
        Entitlement::SubscriptionCovered => (
            Action::learn(id, true),
            vec![wishlist_toggle()],
            WishlistControl::Available {
                in_wishlist: input.in_wishlist,
            },
        ),
        Entitlement::Locked => {
            let available = WishlistControl::Available {
                in_wishlist: input.in_wishlist,
            };
            match input.verdict.upsell_plan.as_deref() {
                Some(plan) => (
                    Action::upgrade(plan),
                    vec![cart_action(), Action::buy_now(id), wishlist_toggle()],
                    available,
                ),
                None => (
                    cart_action(),
                    vec![Action::buy_now(id), wishlist_toggle()],
                    available,
                ),
            }
        }
    };

    ActionSet {
        entitlement: input.verdict.entitlement,
        primary,
        secondary,
        wishlist,
        ready: input.ready,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{Destination, Effect};

    fn verdict(entitlement: Entitlement, plan: Option<&str>) -> AccessVerdict {
        AccessVerdict {
            entitlement,
            upsell_plan: plan.map(str::to_string),
        }
    }

    fn resolve(verdict: &AccessVerdict, in_cart: bool, in_wishlist: bool) -> ActionSet {
        let id = CourseId::new("c-1");
        resolve_actions(GuardInput {
            course_id: &id,
            verdict,
            in_cart,
            in_wishlist,
            owned: verdict.entitlement == Entitlement::Owned,
            ready: true,
        })
    }

    fn kinds(set: &ActionSet) -> Vec<ActionKind> {
        set.secondary.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_owned_learns_and_disables_wishlist() {
        let set = resolve(&verdict(Entitlement::Owned, None), true, true);
        assert_eq!(set.primary.kind, ActionKind::Learn);
        assert!(set.secondary.is_empty());
        assert_eq!(set.wishlist, WishlistControl::Disabled);
        assert_eq!(
            set.permit(ActionKind::ToggleWishlist),
            Err(CommerceError::WishlistDisabled)
        );
    }

    #[test]
    fn test_free_enrolls_then_clears_cart_and_wishlist() {
        let set = resolve(&verdict(Entitlement::Free, None), false, false);
        assert_eq!(set.primary.kind, ActionKind::Enroll);
        assert!(set.secondary.is_empty());
        assert_eq!(set.wishlist, WishlistControl::Hidden);
        assert!(matches!(
            set.primary.effects.last(),
            Some(Effect::RemoveFromCartAndWishlist { .. })
        ));
    }

    #[test]
    fn test_enrolled_free_course_learns_instead_of_enrolling() {
        let id = CourseId::new("c-1");
        let v = verdict(Entitlement::Free, None);
        let set = resolve_actions(GuardInput {
            course_id: &id,
            verdict: &v,
            in_cart: false,
            in_wishlist: false,
            owned: true,
            ready: true,
        });
        assert_eq!(set.entitlement, Entitlement::Free);
        assert_eq!(set.primary.kind, ActionKind::Learn);
        assert!(!set.offers(ActionKind::Enroll));
        assert_eq!(set.wishlist, WishlistControl::Disabled);
        assert!(matches!(
            set.permit(ActionKind::Enroll),
            Err(CommerceError::ActionUnavailable(_))
        ));
    }

    #[test]
    fn test_subscription_covered_keeps_wishlist_usable() {
        let set = resolve(&verdict(Entitlement::SubscriptionCovered, None), false, false);
        assert_eq!(set.primary.kind, ActionKind::Learn);
        assert_eq!(
            set.primary.effects,
            vec![Effect::Navigate(Destination::Learning {
                course_id: CourseId::new("c-1"),
                included_in_plan: true,
            })]
        );
        assert_eq!(kinds(&set), vec![ActionKind::ToggleWishlist]);
        assert!(set.permit(ActionKind::ToggleWishlist).is_ok());
    }

    #[test]
    fn test_locked_with_plan_upsells_first() {
        let set = resolve(&verdict(Entitlement::Locked, Some("Pro")), false, false);
        assert_eq!(set.primary.kind, ActionKind::UpgradePlan);
        assert_eq!(
            kinds(&set),
            vec![ActionKind::AddToCart, ActionKind::BuyNow, ActionKind::ToggleWishlist]
        );

        let set = resolve(&verdict(Entitlement::Locked, Some("Pro")), true, false);
        assert_eq!(set.secondary[0].kind, ActionKind::GoToCart);
    }

    #[test]
    fn test_locked_without_plan_offers_cart() {
        let set = resolve(&verdict(Entitlement::Locked, None), false, true);
        assert_eq!(set.primary.kind, ActionKind::AddToCart);
        assert_eq!(kinds(&set), vec![ActionKind::BuyNow, ActionKind::ToggleWishlist]);
        assert_eq!(set.wishlist, WishlistControl::Available { in_wishlist: true });

        let set = resolve(&verdict(Entitlement::Locked, None), true, false);
        assert_eq!(set.primary.kind, ActionKind::GoToCart);
    }

    #[test]
    fn test_buy_now_goes_to_single_item_checkout() {
        let set = resolve(&verdict(Entitlement::Locked, None), false, false);
        let buy = set.permit(ActionKind::BuyNow).unwrap();
        assert_eq!(
            buy.effects.last(),
            Some(&Effect::Navigate(Destination::Checkout {
                course_id: CourseId::new("c-1")
            }))
        );
    }

    #[test]
    fn test_nothing_runs_before_ready() {
        let id = CourseId::new("c-1");
        let v = verdict(Entitlement::Locked, None);
        let set = resolve_actions(GuardInput {
            course_id: &id,
            verdict: &v,
            in_cart: false,
            in_wishlist: false,
            owned: false,
            ready: false,
        });
        assert_eq!(set.permit(ActionKind::AddToCart), Err(CommerceError::NotReady));
        assert_eq!(set.permit(ActionKind::BuyNow), Err(CommerceError::NotReady));
    }

    #[test]
    fn test_unoffered_action_is_rejected() {
        let set = resolve(&verdict(Entitlement::Free, None), false, false);
        assert!(matches!(
            set.permit(ActionKind::BuyNow),
            Err(CommerceError::ActionUnavailable(_))
        ));
    }
}
