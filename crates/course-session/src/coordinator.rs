//! Cart and wishlist coordination across sign-in state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use course_cache::CartStore;
use course_commerce::cart::{CartState, CourseList, WishlistState};
use course_commerce::catalog::CourseStub;
use course_commerce::entitlement::{EnrollmentSet, Viewer};
use course_commerce::guard::{ActionKind, ActionSet, Destination, Effect};
use course_commerce::ids::CourseId;
use course_commerce::{CommerceError, ConflictKind, Notice};
use course_data::{AddOutcome, EnrollReceipt, FetchError, MarketplaceApi};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of merging the guest cart into the remote cart on sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Add requests issued, one per guest item.
    pub attempted: usize,
    /// Items newly added remotely.
    pub merged: usize,
    /// Items the remote cart already had.
    pub already_present: usize,
    /// Items whose add request failed, with the reason. They are not retried.
    pub failed: Vec<(CourseId, String)>,
}

impl MergeReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What a wishlist toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WishlistChange {
    Added,
    Removed,
    /// The backend already had it; the local list now agrees.
    AlreadyPresent,
}

/// Result of performing a guarded action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionReport {
    /// Where to go next, if the action navigates.
    pub destination: Option<Destination>,
    /// Message to show, if any.
    pub notice: Option<Notice>,
}

#[derive(Debug, Default)]
struct Session {
    viewer: Viewer,
    /// `None` until fetched, or after the fetch failed.
    remote_cart: Option<CourseList>,
    wishlist: WishlistState,
    enrollments: EnrollmentSet,
}

/// Owns the viewer's cart, wishlist and enrollment state.
///
/// A guest's cart lives in the device-local [`CartStore`]. A member's cart
/// and wishlist live on the backend and are mirrored here. Signing in merges
/// the guest cart into the remote one.
pub struct CartWishlistCoordinator {
    api: Arc<dyn MarketplaceApi>,
    guest: Arc<dyn CartStore>,
    session: Mutex<Session>,
}

impl CartWishlistCoordinator {
    /// Start as a guest.
    pub fn new(api: Arc<dyn MarketplaceApi>, guest: Arc<dyn CartStore>) -> Self {
        Self {
            api,
            guest,
            session: Mutex::new(Session::default()),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn viewer(&self) -> Viewer {
        self.session().viewer.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().viewer.is_authenticated()
    }

    /// The cart that is live right now.
    ///
    /// A member whose remote cart is unavailable sees the guest cart.
    pub fn cart_state(&self) -> Result<CartState, CommerceError> {
        let remote = {
            let session = self.session();
            if session.viewer.is_authenticated() {
                session.remote_cart.clone()
            } else {
                None
            }
        };
        match remote {
            Some(courses) => Ok(CartState::Remote { courses }),
            None => Ok(CartState::Guest {
                items: self.guest.get()?,
            }),
        }
    }

    pub fn wishlist_state(&self) -> WishlistState {
        self.session().wishlist.clone()
    }

    pub fn enrollments(&self) -> EnrollmentSet {
        self.session().enrollments.clone()
    }

    /// Check cart membership. An unreadable guest store counts as empty.
    pub fn in_cart(&self, course_id: &CourseId) -> bool {
        match self.cart_state() {
            Ok(cart) => cart.contains(course_id),
            Err(err) => {
                warn!(%course_id, error = %err, "cart unavailable");
                false
            }
        }
    }

    pub fn in_wishlist(&self, course_id: &CourseId) -> bool {
        self.session().wishlist.contains(course_id)
    }

    /// Mirror freshly fetched remote state for `viewer`.
    ///
    /// `None` marks a fetch that failed. Enrollments only ever grow. Ignored
    /// if the viewer has changed since the fetch was issued.
    pub fn sync_remote(
        &self,
        viewer: &Viewer,
        cart: Option<Vec<CourseId>>,
        wishlist: Option<Vec<CourseId>>,
        enrollments: Option<EnrollmentSet>,
    ) {
        let mut session = self.session();
        if &session.viewer != viewer || !viewer.is_authenticated() {
            debug!("ignoring remote state for a previous viewer");
            return;
        }
        session.remote_cart = cart.map(|ids| ids.into_iter().collect());
        session.wishlist = match wishlist {
            Some(ids) => WishlistState::loaded(ids),
            None => WishlistState::Unavailable,
        };
        if let Some(owned) = enrollments {
            session.enrollments.extend(owned.iter().cloned());
        }
    }

    /// Switch to a signed-in viewer and merge the guest cart into theirs.
    ///
    /// One add request is issued per guest item, in guest order. Failures are
    /// logged and skipped. The guest store is cleared once every item has
    /// been attempted.
    pub async fn login(&self, viewer: Viewer) -> Result<MergeReport, CommerceError> {
        if !viewer.is_authenticated() {
            return Err(CommerceError::AuthenticationRequired);
        }
        {
            let mut session = self.session();
            *session = Session {
                viewer: viewer.clone(),
                ..Session::default()
            };
        }

        let guest_cart = self.guest.get()?;
        let mut report = MergeReport::default();
        if guest_cart.is_empty() {
            return Ok(report);
        }

        let mut merged_ids = CourseList::new();
        for stub in guest_cart.items() {
            report.attempted += 1;
            match self.api.add_to_cart(&stub.id).await {
                Ok(AddOutcome::Added) => {
                    report.merged += 1;
                    merged_ids.insert(stub.id.clone());
                }
                Ok(AddOutcome::AlreadyPresent) => {
                    report.already_present += 1;
                    merged_ids.insert(stub.id.clone());
                }
                Err(err) => {
                    warn!(course_id = %stub.id, error = %err, "guest cart item not merged");
                    report.failed.push((stub.id.clone(), err.to_string()));
                }
            }
        }
        self.guest.clear()?;

        {
            let mut session = self.session();
            if session.viewer == viewer {
                let cart = session.remote_cart.get_or_insert_with(CourseList::new);
                for id in merged_ids.iter() {
                    cart.insert(id.clone());
                }
            }
        }

        info!(
            attempted = report.attempted,
            merged = report.merged,
            already_present = report.already_present,
            failed = report.failed.len(),
            "guest cart merged"
        );
        Ok(report)
    }

    /// Return to guest mode. Remote mirrors are dropped; the guest store is
    /// authoritative again.
    pub fn logout(&self) {
        let mut session = self.session();
        *session = Session::default();
        info!("signed out, guest cart active");
    }

    /// Add a course to the live cart. Adding a present course is a no-op.
    pub async fn add_to_cart(&self, stub: &CourseStub) -> Result<AddOutcome, CommerceError> {
        let (authenticated, listed) = {
            let session = self.session();
            let listed = session
                .remote_cart
                .as_ref()
                .is_some_and(|cart| cart.contains(&stub.id));
            (session.viewer.is_authenticated(), listed)
        };

        if !authenticated {
            let added = self.guest.add(stub.clone())?;
            debug!(course_id = %stub.id, added, "guest cart add");
            return Ok(if added {
                AddOutcome::Added
            } else {
                AddOutcome::AlreadyPresent
            });
        }
        if listed {
            return Ok(AddOutcome::AlreadyPresent);
        }

        let outcome = self.api.add_to_cart(&stub.id).await?;
        if let Some(cart) = self.session().remote_cart.as_mut() {
            cart.insert(stub.id.clone());
        }
        debug!(course_id = %stub.id, ?outcome, "remote cart add");
        Ok(outcome)
    }

    /// Remove a course from the live cart.
    pub async fn remove_from_cart(&self, course_id: &CourseId) -> Result<bool, CommerceError> {
        if !self.is_authenticated() {
            return Ok(self.guest.remove(course_id)?);
        }
        self.api.remove_from_cart(course_id).await?;
        let removed = self
            .session()
            .remote_cart
            .as_mut()
            .is_some_and(|cart| cart.remove(course_id));
        Ok(removed)
    }

    /// Flip wishlist membership. Guests have no wishlist, and an owned course
    /// can't be wishlisted.
    pub async fn toggle_wishlist(&self, course_id: &CourseId) -> Result<WishlistChange, CommerceError> {
        let (authenticated, owned, listed) = {
            let session = self.session();
            (
                session.viewer.is_authenticated(),
                session.enrollments.contains(course_id),
                session.wishlist.contains(course_id),
            )
        };
        if !authenticated {
            return Err(CommerceError::AuthenticationRequired);
        }
        if owned {
            return Err(CommerceError::WishlistDisabled);
        }

        if listed {
            self.api.remove_from_wishlist(course_id).await?;
            self.session().wishlist.remove(course_id);
            return Ok(WishlistChange::Removed);
        }

        let outcome = self.api.add_to_wishlist(course_id).await?;
        self.session().wishlist.insert(course_id.clone());
        Ok(match outcome {
            AddOutcome::Added => WishlistChange::Added,
            AddOutcome::AlreadyPresent => WishlistChange::AlreadyPresent,
        })
    }

    /// Enroll the viewer. On success the course becomes owned and leaves the
    /// cart and wishlist.
    pub async fn enroll(&self, course_id: &CourseId) -> Result<EnrollReceipt, CommerceError> {
        let receipt = self.request_enrollment(course_id).await?;
        if receipt.success {
            self.mark_owned(course_id).await;
        }
        Ok(receipt)
    }

    /// Record ownership and drop the course from cart and wishlist.
    ///
    /// A member whose cart or wishlist mirror is unavailable gets the remote
    /// removal anyway, since the backend may still list the course. Removal
    /// failures are logged; ownership is recorded regardless.
    pub async fn mark_owned(&self, course_id: &CourseId) {
        let (in_remote_cart, in_wishlist) = {
            let mut session = self.session();
            session.enrollments.insert(course_id.clone());
            let member = session.viewer.is_authenticated();
            let in_cart = match session.remote_cart.as_ref() {
                Some(cart) => cart.contains(course_id),
                None => member,
            };
            let in_wishlist = match &session.wishlist {
                WishlistState::Loaded { courses } => courses.contains(course_id),
                WishlistState::Unavailable => member,
            };
            (in_cart, in_wishlist)
        };

        if let Err(err) = self.guest.remove(course_id) {
            warn!(%course_id, error = %err, "guest cart removal failed");
        }
        if in_remote_cart {
            if let Err(err) = self.api.remove_from_cart(course_id).await {
                log_removal_failure(course_id, "cart", &err);
            }
        }
        if in_wishlist {
            if let Err(err) = self.api.remove_from_wishlist(course_id).await {
                log_removal_failure(course_id, "wishlist", &err);
            }
        }

        let mut session = self.session();
        if let Some(cart) = session.remote_cart.as_mut() {
            cart.remove(course_id);
        }
        session.wishlist.remove(course_id);
    }

    /// Add to the live cart, then hand back a single-item checkout.
    pub async fn buy_now(&self, stub: &CourseStub) -> Result<Destination, CommerceError> {
        self.add_to_cart(stub).await?;
        Ok(Destination::Checkout {
            course_id: stub.id.clone(),
        })
    }

    /// Perform an action from `actions`, running its effects in order.
    ///
    /// The action must pass [`ActionSet::permit`]. A refused enrollment stops
    /// the remaining effects and yields a warning notice.
    pub async fn perform(
        &self,
        actions: &ActionSet,
        kind: ActionKind,
        stub: &CourseStub,
    ) -> Result<ActionReport, CommerceError> {
        let action = actions.permit(kind)?;
        let mut report = ActionReport::default();

        for effect in &action.effects {
            match effect {
                Effect::Navigate(destination) => report.destination = Some(destination.clone()),
                Effect::CreateEnrollment { course_id } => {
                    let receipt = self.request_enrollment(course_id).await?;
                    if !receipt.success {
                        report.notice = Some(Notice::warning(
                            receipt
                                .message
                                .unwrap_or_else(|| "Enrollment didn't go through.".to_string()),
                        ));
                        return Ok(report);
                    }
                    report.notice = Some(Notice::info("You're enrolled."));
                }
                Effect::RemoveFromCartAndWishlist { course_id } => self.mark_owned(course_id).await,
                Effect::AddToCart { course_id } => {
                    if stub.id != *course_id {
                        warn!(%course_id, stub_id = %stub.id, "cart stub is for another course");
                        return Err(CommerceError::ActionUnavailable(kind.as_str().to_string()));
                    }
                    if self.add_to_cart(stub).await? == AddOutcome::AlreadyPresent
                        && kind == ActionKind::AddToCart
                    {
                        report.notice = CommerceError::Conflict(ConflictKind::AlreadyInCart).notice();
                    }
                }
                Effect::AddToWishlist { course_id } | Effect::RemoveFromWishlist { course_id } => {
                    if self.toggle_wishlist(course_id).await? == WishlistChange::AlreadyPresent {
                        report.notice =
                            CommerceError::Conflict(ConflictKind::AlreadyInWishlist).notice();
                    }
                }
            }
        }
        Ok(report)
    }

    async fn request_enrollment(&self, course_id: &CourseId) -> Result<EnrollReceipt, CommerceError> {
        if !self.is_authenticated() {
            return Err(CommerceError::AuthenticationRequired);
        }
        if self.session().enrollments.contains(course_id) {
            return Err(CommerceError::Conflict(ConflictKind::AlreadyOwned));
        }
        let receipt = self.api.enroll(course_id).await?;
        if receipt.success {
            info!(%course_id, "enrolled");
        } else {
            warn!(%course_id, message = ?receipt.message, "enrollment refused");
        }
        Ok(receipt)
    }
}

/// A 404 means the backend never listed the course.
fn log_removal_failure(course_id: &CourseId, list: &str, err: &FetchError) {
    if err.is_not_found() {
        debug!(%course_id, list, "course was not listed remotely");
    } else {
        warn!(%course_id, list, error = %err, "remote removal after enrollment failed");
    }
}

impl std::fmt::Debug for CartWishlistCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartWishlistCoordinator")
            .field("viewer", &self.viewer())
            .finish_non_exhaustive()
    }
}
