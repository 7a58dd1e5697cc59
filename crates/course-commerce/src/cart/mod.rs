//! Cart and wishlist state.
//!
//! Contains the guest cart kept on the device, the remote id lists mirrored
//! from the backend, and the switch between them.

mod guest;
mod state;

pub use guest::GuestCart;
pub use state::{CartState, CourseList, WishlistState};
