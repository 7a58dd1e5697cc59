//! A resolved course view.

use chrono::{DateTime, Utc};
use course_commerce::cart::{CartState, WishlistState};
use course_commerce::catalog::{Course, CourseStub};
use course_commerce::entitlement::{resolve_entitlement, AccessVerdict, EnrollmentSet, SubscriptionSnapshot, Viewer};
use course_commerce::guard::{resolve_actions, ActionSet, GuardInput};
use course_commerce::pricing::{resolve_price, PriceResult};

use crate::status::StatusBoard;

/// Everything a course page renders, resolved at one instant.
#[derive(Debug, Clone)]
pub struct CourseView {
    pub course: Course,
    pub viewer: Viewer,
    pub price: PriceResult,
    pub verdict: AccessVerdict,
    /// `None` when not fetched or the fetch failed. Never grants access.
    pub subscription: Option<SubscriptionSnapshot>,
    pub enrollments: EnrollmentSet,
    pub cart: CartState,
    pub wishlist: WishlistState,
    pub board: StatusBoard,
    /// Every status fetch has settled.
    pub ready: bool,
}

impl CourseView {
    /// Resolve price and entitlement for the given inputs at `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        course: Course,
        viewer: Viewer,
        subscription: Option<SubscriptionSnapshot>,
        enrollments: EnrollmentSet,
        cart: CartState,
        wishlist: WishlistState,
        board: StatusBoard,
        now: DateTime<Utc>,
    ) -> Self {
        let price = resolve_price(&course, now);
        let verdict = resolve_entitlement(&course, &viewer, subscription.as_ref(), &enrollments);
        let ready = board.is_ready();
        Self {
            course,
            viewer,
            price,
            verdict,
            subscription,
            enrollments,
            cart,
            wishlist,
            board,
            ready,
        }
    }

    pub fn in_cart(&self) -> bool {
        self.cart.contains(&self.course.id)
    }

    pub fn in_wishlist(&self) -> bool {
        self.wishlist.contains(&self.course.id)
    }

    /// The signed-in viewer is enrolled in this course.
    pub fn is_owned(&self) -> bool {
        self.viewer.is_authenticated() && self.enrollments.contains(&self.course.id)
    }

    /// The actions this view offers.
    pub fn actions(&self) -> ActionSet {
        resolve_actions(GuardInput {
            course_id: &self.course.id,
            verdict: &self.verdict,
            in_cart: self.in_cart(),
            in_wishlist: self.in_wishlist(),
            owned: self.is_owned(),
            ready: self.ready,
        })
    }

    /// The guest cart stub for this course, at the price shown.
    pub fn stub(&self) -> CourseStub {
        CourseStub::from_course(&self.course, self.price.final_price)
    }
}
