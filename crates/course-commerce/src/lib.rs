//! Course marketplace domain types and resolvers.
//!
//! This crate decides what a viewer pays and what a viewer may do with a
//! course:
//!
//! - **Pricing**: effective price from a time-windowed percent or fixed discount
//! - **Entitlement**: free, owned, covered by subscription, or locked
//! - **Guard**: the actions a course view offers and what each one does
//! - **Cart**: guest cart stubs and remote cart/wishlist id lists
//!
//! Every resolver is a total function of its inputs. Malformed backend data
//! degrades to a safe default instead of failing.
//!
//! # Example
//!
//! ```rust
//! use course_commerce::prelude::*;
//!
//! let course = Course::new("42", "Async Rust", Money::new(10000, Currency::USD))
//!     .with_discount(CourseDiscount::percent(20.0));
//!
//! let price = resolve_price_now(&course);
//! assert_eq!(price.final_price.display(), "$80.00");
//!
//! let verdict = resolve_entitlement(&course, &Viewer::Guest, None, &EnrollmentSet::new());
//! let actions = resolve_actions(GuardInput {
//!     course_id: &course.id,
//!     verdict: &verdict,
//!     in_cart: false,
//!     in_wishlist: false,
//!     owned: false,
//!     ready: true,
//! });
//! assert_eq!(actions.primary.kind, ActionKind::AddToCart);
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod parse;

pub mod cart;
pub mod catalog;
pub mod entitlement;
pub mod guard;
pub mod pricing;

pub use error::{CommerceError, ConflictKind, Notice, NoticeLevel};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, ConflictKind, Notice, NoticeLevel};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::parse::{Decoded, ParseError};

    // Catalog
    pub use crate::catalog::{Course, CourseAccess, CourseDiscount, CourseStub, DiscountWindow};

    // Pricing
    pub use crate::pricing::{resolve_price, resolve_price_now, CartSummary, PriceResult};

    // Entitlement
    pub use crate::entitlement::{
        resolve_entitlement, AccessVerdict, Entitlement, EnrollmentSet, SubscriptionSnapshot,
        Viewer,
    };

    // Guard
    pub use crate::guard::{
        resolve_actions, Action, ActionKind, ActionSet, Destination, Effect, GuardInput,
        WishlistControl,
    };

    // Cart
    pub use crate::cart::{CartState, CourseList, GuestCart, WishlistState};
}
