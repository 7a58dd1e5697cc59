//! Wiring a session from configuration.

use std::sync::Arc;

use course_cache::{Cache, CacheError, CartStore, GuestCartStore};
use course_commerce::CommerceError;
use course_data::{ConfigError, FetchError, HttpMarketplaceApi, MarketplaceApi, MarketplaceConfig};
use tracing::info;

use crate::{CartWishlistCoordinator, CourseViewLoader};

/// Errors building a [`Marketplace`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] FetchError),

    #[error("Guest cart store unavailable: {0}")]
    GuestStore(#[from] CacheError),
}

impl From<SessionError> for CommerceError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Config(err) => err.into(),
            SessionError::Client(err) => err.into(),
            SessionError::GuestStore(err) => err.into(),
        }
    }
}

/// A coordinator and loader sharing one backend and guest store.
#[derive(Debug)]
pub struct Marketplace {
    pub coordinator: Arc<CartWishlistCoordinator>,
    pub loader: CourseViewLoader,
}

impl Marketplace {
    /// Build everything from `config`: logging, the HTTP client and the
    /// guest store.
    pub fn from_config(config: &MarketplaceConfig) -> Result<Self, SessionError> {
        config.validate()?;
        course_observability::init(&config.logging);

        let api = Arc::new(HttpMarketplaceApi::new(config.clone())?);
        let marketplace = Self::with_api(config, api)?;
        info!(
            base_url = %config.api.base_url,
            persistent = config.guest_store.directory.is_some(),
            "marketplace session ready"
        );
        Ok(marketplace)
    }

    /// Build around an existing backend. The guest store still follows
    /// `config`.
    pub fn with_api(
        config: &MarketplaceConfig,
        api: Arc<dyn MarketplaceApi>,
    ) -> Result<Self, SessionError> {
        let guest = open_guest_store(config)?;
        let coordinator = Arc::new(CartWishlistCoordinator::new(api.clone(), guest));
        let loader = CourseViewLoader::from_config(api, coordinator.clone(), config);
        Ok(Self {
            coordinator,
            loader,
        })
    }
}

/// Open the configured guest cart store: file-backed when a directory is
/// set, in memory otherwise.
pub fn open_guest_store(config: &MarketplaceConfig) -> Result<Arc<dyn CartStore>, CacheError> {
    let cache = match &config.guest_store.directory {
        Some(dir) => Cache::open_dir(dir)?,
        None => Cache::in_memory(),
    };
    Ok(Arc::new(GuestCartStore::with_key(
        cache,
        config.guest_store.key.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_commerce::catalog::{Course, CourseStub};
    use course_commerce::money::{Currency, Money};

    fn stub() -> CourseStub {
        let course = Course::new("1", "Ownership", Money::new(1500, Currency::USD));
        CourseStub::from_course(&course, course.base_price)
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MarketplaceConfig::default();
        config.guest_store.directory = Some(dir.path().to_path_buf());
        config.guest_store.key = "cart_test".into();

        open_guest_store(&config).unwrap().add(stub()).unwrap();
        let reopened = open_guest_store(&config).unwrap();
        assert_eq!(reopened.get().unwrap().len(), 1);
    }

    #[test]
    fn test_in_memory_store_by_default() {
        let config = MarketplaceConfig::default();
        let store = open_guest_store(&config).unwrap();
        store.add(stub()).unwrap();
        assert!(open_guest_store(&config).unwrap().get().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = MarketplaceConfig::default();
        config.api.base_url = "not a url".into();
        let err = Marketplace::from_config(&config).unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
        assert!(matches!(CommerceError::from(err), CommerceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_from_config_starts_as_guest() {
        let marketplace = Marketplace::from_config(&MarketplaceConfig::default()).unwrap();
        assert!(!marketplace.coordinator.is_authenticated());
        assert!(marketplace.loader.view().is_none());
    }
}
