//! Course view loading.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use course_commerce::catalog::Course;
use course_commerce::entitlement::{EnrollmentSet, SubscriptionSnapshot, Viewer};
use course_commerce::ids::CourseId;
use course_data::{
    DependencyTag, FetchError, MarketplaceApi, MarketplaceConfig, DEFAULT_STATUS_TIMEOUT,
};
use tracing::{debug, info, warn};

use crate::coordinator::CartWishlistCoordinator;
use crate::status::{StatusBoard, ViewStatus};
use crate::view::CourseView;

/// What became of a load once its fetches settled.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The results were applied and the view is in this state.
    Applied(ViewStatus),
    /// A newer load was requested meanwhile; the results were dropped.
    Discarded,
}

impl LoadOutcome {
    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }
}

#[derive(Debug, Default)]
struct LoaderState {
    status: ViewStatus,
    course_id: Option<CourseId>,
    viewer: Viewer,
    board: StatusBoard,
    course: Option<Course>,
    subscription: Option<SubscriptionSnapshot>,
}

/// Results of the four status fetches.
struct StatusFetches {
    enrollments: Result<EnrollmentSet, FetchError>,
    wishlist: Result<Vec<CourseId>, FetchError>,
    subscription: Result<SubscriptionSnapshot, FetchError>,
    cart: Result<Vec<CourseId>, FetchError>,
}

/// Loads one course view at a time.
///
/// The course and the four status fetches run concurrently. Each fetch is
/// bounded by the status timeout and a late fetch settles as failed. Client
/// retries are budgeted inside the same timeout by
/// [`MarketplaceConfig::policy_for`]. Only the most recently requested load
/// may apply its results.
pub struct CourseViewLoader {
    api: Arc<dyn MarketplaceApi>,
    coordinator: Arc<CartWishlistCoordinator>,
    status_timeout: Duration,
    generation: AtomicU64,
    state: Mutex<LoaderState>,
}

impl CourseViewLoader {
    pub fn new(api: Arc<dyn MarketplaceApi>, coordinator: Arc<CartWishlistCoordinator>) -> Self {
        Self {
            api,
            coordinator,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            generation: AtomicU64::new(0),
            state: Mutex::new(LoaderState::default()),
        }
    }

    /// Build a loader using the configured status timeout.
    pub fn from_config(
        api: Arc<dyn MarketplaceApi>,
        coordinator: Arc<CartWishlistCoordinator>,
        config: &MarketplaceConfig,
    ) -> Self {
        Self::new(api, coordinator).with_status_timeout(config.status_timeout())
    }

    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    pub fn coordinator(&self) -> &Arc<CartWishlistCoordinator> {
        &self.coordinator
    }

    fn state(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> ViewStatus {
        self.state().status.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state().status.is_ready()
    }

    /// The course most recently requested.
    pub fn course_id(&self) -> Option<CourseId> {
        self.state().course_id.clone()
    }

    /// Status of the current view's fetches.
    pub fn board(&self) -> StatusBoard {
        self.state().board.clone()
    }

    /// Load `course_id` for the current viewer.
    ///
    /// A guest only fetches the course; the remote status fetches settle as
    /// skipped. Results are dropped if another load started meanwhile.
    pub async fn load(&self, course_id: &CourseId) -> LoadOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let viewer = self.coordinator.viewer();
        let authenticated = viewer.is_authenticated();
        {
            let mut state = self.state();
            *state = LoaderState {
                status: ViewStatus::Loading,
                course_id: Some(course_id.clone()),
                viewer: viewer.clone(),
                board: if authenticated {
                    StatusBoard::new()
                } else {
                    StatusBoard::skipped()
                },
                course: None,
                subscription: None,
            };
        }
        debug!(%course_id, generation, authenticated, "loading course view");

        if !authenticated {
            let course = self
                .bounded(DependencyTag::Course, self.api.fetch_course(course_id))
                .await;
            return self.apply(generation, &viewer, course, None);
        }

        let (course, enrollments, wishlist, subscription, cart) = futures::join!(
            self.bounded(DependencyTag::Course, self.api.fetch_course(course_id)),
            self.bounded(DependencyTag::Enrollments, self.api.fetch_enrollments()),
            self.bounded(DependencyTag::Wishlist, self.api.fetch_wishlist()),
            self.bounded(DependencyTag::Subscription, self.api.fetch_subscription()),
            self.bounded(DependencyTag::Cart, self.api.fetch_cart()),
        );
        let fetches = StatusFetches {
            enrollments,
            wishlist,
            subscription,
            cart,
        };
        self.apply(generation, &viewer, course, Some(fetches))
    }

    /// Drop the current view. In-flight loads will be discarded.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.state() = LoaderState::default();
    }

    async fn bounded<T>(
        &self,
        tag: DependencyTag,
        fetch: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        match tokio::time::timeout(self.status_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => {
                warn!(dependency = %tag, timeout = ?self.status_timeout, "fetch timed out");
                Err(FetchError::Timeout(format!(
                    "{tag} after {}ms",
                    self.status_timeout.as_millis()
                )))
            }
        }
    }

    fn apply(
        &self,
        generation: u64,
        viewer: &Viewer,
        course: Result<Course, FetchError>,
        fetches: Option<StatusFetches>,
    ) -> LoadOutcome {
        let mut state = self.state();
        let current = self.generation.load(Ordering::SeqCst);
        if current != generation {
            debug!(generation, current, "discarding stale course view");
            return LoadOutcome::Discarded;
        }

        if let Some(fetches) = fetches {
            state.board.record(DependencyTag::Enrollments, &fetches.enrollments);
            state.board.record(DependencyTag::Wishlist, &fetches.wishlist);
            state.board.record(DependencyTag::Subscription, &fetches.subscription);
            state.board.record(DependencyTag::Cart, &fetches.cart);
            for tag in state.board.degraded() {
                warn!(dependency = %tag, "status fetch degraded to its default");
            }
            state.subscription = fetches.subscription.ok();
            self.coordinator.sync_remote(
                viewer,
                fetches.cart.ok(),
                fetches.wishlist.ok(),
                fetches.enrollments.ok(),
            );
        }

        let status = match course {
            Ok(course) => {
                info!(course_id = %course.id, generation, "course view ready");
                state.course = Some(course);
                ViewStatus::Ready
            }
            Err(err) => {
                warn!(course_id = ?state.course_id, error = %err, "course unavailable");
                state.subscription = None;
                ViewStatus::Error(err.into())
            }
        };
        state.status = status.clone();
        LoadOutcome::Applied(status)
    }

    /// The current view resolved at `now`, once the course has loaded.
    ///
    /// The view is not ready if the viewer changed since it loaded.
    pub fn view_at(&self, now: DateTime<Utc>) -> Option<CourseView> {
        let (course, subscription, board, loaded_for) = {
            let state = self.state();
            let course = state.course.clone()?;
            (
                course,
                state.subscription.clone(),
                state.board.clone(),
                state.viewer.clone(),
            )
        };

        let viewer = self.coordinator.viewer();
        let cart = self.coordinator.cart_state().unwrap_or_else(|err| {
            warn!(error = %err, "cart unavailable, showing empty cart");
            Default::default()
        });
        let mut view = CourseView::resolve(
            course,
            viewer.clone(),
            subscription,
            self.coordinator.enrollments(),
            cart,
            self.coordinator.wishlist_state(),
            board,
            now,
        );
        if viewer != loaded_for {
            view.ready = false;
        }
        Some(view)
    }

    pub fn view(&self) -> Option<CourseView> {
        self.view_at(Utc::now())
    }
}

impl std::fmt::Debug for CourseViewLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseViewLoader")
            .field("status_timeout", &self.status_timeout)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
