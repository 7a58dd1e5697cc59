//! Action gating.
//!
//! Turns an access verdict plus cart/wishlist membership into the actions a
//! viewer may take, and refuses every action until the view is ready.

mod action;
mod resolver;

pub use action::{Action, ActionKind, Destination, Effect};
pub use resolver::{resolve_actions, ActionSet, GuardInput, WishlistControl};
