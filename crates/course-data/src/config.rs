//! Marketplace client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use course_commerce::money::Currency;
use course_observability::LogConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, DependencyTag, FetchPolicy, RetryPolicy};

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "MARKETPLACE_API_URL";
/// Environment variable overriding `api.bearer_token`.
pub const ENV_TOKEN: &str = "MARKETPLACE_TOKEN";

/// Marketplace configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Backend connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Timeouts and retries.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Device-local guest cart.
    #[serde(default)]
    pub guest_store: GuestStoreConfig,

    #[serde(default)]
    pub logging: LogConfig,
}

impl MarketplaceConfig {
    /// Load config from a file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let config: Self = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file, in the format its extension implies.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?
        } else {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?
        };
        std::fs::write(path, content).map_err(|source| ConfigError::Read {
            path: display,
            source,
        })
    }

    /// Apply `MARKETPLACE_API_URL` and `MARKETPLACE_TOKEN` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api.bearer_token = Some(token.trim().to_string());
        }
        self
    }

    /// Check values that serde defaults can't guard.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be an http(s) URL, got '{url}'"
            )));
        }
        if Currency::from_code(&self.api.currency).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unsupported currency '{}'",
                self.api.currency
            )));
        }
        if self.fetch.status_timeout_ms == 0 || self.fetch.write_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        if self.guest_store.key.trim().is_empty() {
            return Err(ConfigError::Invalid("guest_store.key is empty".to_string()));
        }
        Ok(())
    }

    /// Currency of course prices. Falls back to USD for an unknown code.
    pub fn currency(&self) -> Currency {
        Currency::from_code(&self.api.currency).unwrap_or_default()
    }

    /// Timeout bounding each status fetch.
    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch.status_timeout_ms)
    }

    /// The read policy for a dependency, with configured overrides applied.
    ///
    /// Every attempt and retry delay fits inside the status timeout.
    pub fn policy_for(&self, tag: DependencyTag) -> FetchPolicy {
        if tag == DependencyTag::Enroll {
            return self.write_policy();
        }
        let retries = self.fetch.max_retries.unwrap_or_else(|| tag.default_max_retries());
        FetchPolicy::within(self.status_timeout(), RetryPolicy::new(retries))
    }

    /// The policy for writes (cart, wishlist, enroll).
    pub fn write_policy(&self) -> FetchPolicy {
        FetchPolicy::write(Duration::from_millis(self.fetch.write_timeout_ms))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token of the signed-in viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// ISO code of the currency prices are quoted in.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_user_agent() -> String {
    format!("course-marketplace/{}", env!("CARGO_PKG_VERSION"))
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token: None,
            user_agent: default_user_agent(),
            currency: default_currency(),
        }
    }
}

/// Timeouts and retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Bound on each status fetch, in milliseconds.
    #[serde(default = "default_status_timeout_ms")]
    pub status_timeout_ms: u64,

    /// Bound on each write, in milliseconds.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Retries for reads. Unset uses each dependency's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

fn default_status_timeout_ms() -> u64 {
    crate::DEFAULT_STATUS_TIMEOUT.as_millis() as u64
}

fn default_write_timeout_ms() -> u64 {
    DependencyTag::Enroll.default_timeout().as_millis() as u64
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            status_timeout_ms: default_status_timeout_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            max_retries: None,
        }
    }
}

/// Guest cart storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestStoreConfig {
    /// Directory for the file-backed store. Unset keeps the cart in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Key the cart list is stored under.
    #[serde(default = "default_guest_key")]
    pub key: String,
}

fn default_guest_key() -> String {
    "guest_cart".to_string()
}

impl Default for GuestStoreConfig {
    fn default() -> Self {
        Self {
            directory: None,
            key: default_guest_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_observability::{LogFormat, LogLevel};

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: MarketplaceConfig = toml::from_str("").unwrap();
        assert_eq!(config, MarketplaceConfig::default());
        assert_eq!(config.status_timeout(), Duration::from_secs(8));
        assert_eq!(config.guest_store.key, "guest_cart");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marketplace.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "https://learn.example.com/api/v1"
currency = "eur"

[fetch]
status_timeout_ms = 3000
max_retries = 0

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = MarketplaceConfig::load(&path).unwrap();
        assert_eq!(config.api.base_url, "https://learn.example.com/api/v1");
        assert_eq!(config.currency(), Currency::EUR);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);

        let policy = config.policy_for(DependencyTag::Wishlist);
        assert_eq!(policy.timeout, Duration::from_secs(3));
        assert_eq!(policy.retry.max_attempts, 0);
    }

    #[test]
    fn test_json_roundtrip_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marketplace.json");
        let mut config = MarketplaceConfig::default();
        config.guest_store.key = "cart_v2".into();
        config.save(&path).unwrap();

        let loaded = MarketplaceConfig::load(&path).unwrap();
        assert_eq!(loaded.guest_store.key, "cart_v2");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = MarketplaceConfig::default();
        config.api.base_url = "ftp://nope".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = MarketplaceConfig::default();
        config.api.currency = "XYZ".into();
        assert!(config.validate().is_err());

        let mut config = MarketplaceConfig::default();
        config.fetch.status_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = MarketplaceConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let config = MarketplaceConfig::default().with_overrides(|name| match name {
            ENV_API_URL => Some("https://staging.example.com/api".to_string()),
            ENV_TOKEN => Some(" secret ".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "https://staging.example.com/api");
        assert_eq!(config.api.bearer_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_enroll_uses_write_policy() {
        let config = MarketplaceConfig::default();
        let policy = config.policy_for(DependencyTag::Enroll);
        assert_eq!(policy.retry.max_attempts, 0);
        assert_eq!(policy.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_read_retries_fit_status_timeout() {
        let config = MarketplaceConfig::default();
        for tag in [DependencyTag::Course, DependencyTag::Cart, DependencyTag::Subscription] {
            let policy = config.policy_for(tag);
            assert!(policy.retry.max_attempts > 0);
            assert!(policy.timeout < config.status_timeout());
            assert!(policy.worst_case() <= config.status_timeout());
        }
    }
}
