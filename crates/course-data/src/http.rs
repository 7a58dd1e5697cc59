//! reqwest-backed marketplace client.

use std::time::Duration;

use async_trait::async_trait;
use course_commerce::catalog::Course;
use course_commerce::entitlement::{EnrollmentSet, SubscriptionSnapshot};
use course_commerce::ids::CourseId;
use course_commerce::money::Currency;
use reqwest::{header, Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use crate::wire::{self, CourseRecord, CourseRef, EnrollRecord, EnrollReceipt, SubscriptionRecord};
use crate::{AddOutcome, DependencyTag, FetchError, FetchPolicy, MarketplaceApi, MarketplaceConfig};

/// Marketplace client speaking JSON over HTTP.
///
/// Reads are retried per their dependency's policy. Writes are sent once.
#[derive(Debug, Clone)]
pub struct HttpMarketplaceApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    currency: Currency,
    config: MarketplaceConfig,
}

impl HttpMarketplaceApi {
    /// Build a client from configuration. The configured bearer token, if
    /// any, authenticates every request.
    pub fn new(config: MarketplaceConfig) -> Result<Self, FetchError> {
        let base_url = config.api.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FetchError::InvalidUrl(base_url));
        }
        let client = Client::builder()
            .user_agent(config.api.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Request(format!("Failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            token: config.api.bearer_token.clone(),
            currency: config.currency(),
            config,
        })
    }

    /// Act as a different viewer.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Absolute URL of an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get(&self, tag: DependencyTag, path: &str) -> Result<Value, FetchError> {
        let policy = self.config.policy_for(tag);
        let url = self.endpoint(path);
        let mut attempt = 0;
        loop {
            match self.send(Method::GET, &url, None, policy.timeout).await {
                Ok(value) => return Ok(value),
                Err(err) if policy.retry.should_retry(&err, attempt) => {
                    let delay = policy.retry.backoff.delay_for_attempt(attempt);
                    warn!(dependency = %tag, %url, attempt, error = %err, ?delay, "retrying fetch");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn write(
        &self,
        method: Method,
        path: &str,
        body: Option<&CourseRef<'_>>,
        policy: FetchPolicy,
    ) -> Result<Value, FetchError> {
        let url = self.endpoint(path);
        self.send(method, &url, body, policy.timeout).await
    }

    async fn add(&self, path: &str, course_id: &CourseId) -> Result<AddOutcome, FetchError> {
        let body = CourseRef { course_id };
        match self
            .write(Method::POST, path, Some(&body), self.config.write_policy())
            .await
        {
            Ok(_) => Ok(AddOutcome::Added),
            Err(err) if err.is_conflict() => {
                debug!(%course_id, path, "already present");
                Ok(AddOutcome::AlreadyPresent)
            }
            Err(err) => Err(err),
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&CourseRef<'_>>,
        timeout: Duration,
    ) -> Result<Value, FetchError> {
        debug!(%method, url, "sending request");
        let mut request = self
            .client
            .request(method, url)
            .timeout(timeout)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_slice(&bytes)?;
        Ok(wire::unwrap_envelope(value))
    }
}

#[async_trait]
impl MarketplaceApi for HttpMarketplaceApi {
    async fn fetch_course(&self, course_id: &CourseId) -> Result<Course, FetchError> {
        let value = self
            .get(DependencyTag::Course, &format!("courses/{course_id}"))
            .await?;
        let record: CourseRecord = serde_json::from_value(value)?;
        Ok(record.into_course(self.currency))
    }

    async fn fetch_enrollments(&self) -> Result<EnrollmentSet, FetchError> {
        let value = self.get(DependencyTag::Enrollments, "enrollments").await?;
        let decoded = wire::enrollment_set(&value);
        if let Some(error) = decoded.error() {
            warn!(%error, "unreadable enrollment listing");
        }
        Ok(decoded.into_inner())
    }

    async fn fetch_wishlist(&self) -> Result<Vec<CourseId>, FetchError> {
        let value = self.get(DependencyTag::Wishlist, "wishlist").await?;
        let decoded = wire::course_ids(&value);
        if let Some(error) = decoded.error() {
            warn!(%error, "unreadable wishlist listing");
        }
        Ok(decoded.into_inner())
    }

    async fn fetch_subscription(&self) -> Result<SubscriptionSnapshot, FetchError> {
        let value = self
            .get(DependencyTag::Subscription, "subscription/overview")
            .await?;
        let record: SubscriptionRecord = serde_json::from_value(value)?;
        Ok(record.into_snapshot())
    }

    async fn fetch_cart(&self) -> Result<Vec<CourseId>, FetchError> {
        let value = self.get(DependencyTag::Cart, "cart").await?;
        let decoded = wire::course_ids(&value);
        if let Some(error) = decoded.error() {
            warn!(%error, "unreadable cart listing");
        }
        Ok(decoded.into_inner())
    }

    async fn add_to_cart(&self, course_id: &CourseId) -> Result<AddOutcome, FetchError> {
        self.add("cart", course_id).await
    }

    async fn remove_from_cart(&self, course_id: &CourseId) -> Result<(), FetchError> {
        self.write(
            Method::DELETE,
            &format!("cart/{course_id}"),
            None,
            self.config.write_policy(),
        )
        .await
        .map(|_| ())
    }

    async fn add_to_wishlist(&self, course_id: &CourseId) -> Result<AddOutcome, FetchError> {
        self.add("wishlist", course_id).await
    }

    async fn remove_from_wishlist(&self, course_id: &CourseId) -> Result<(), FetchError> {
        self.write(
            Method::DELETE,
            &format!("wishlist/{course_id}"),
            None,
            self.config.write_policy(),
        )
        .await
        .map(|_| ())
    }

    async fn enroll(&self, course_id: &CourseId) -> Result<EnrollReceipt, FetchError> {
        let value = self
            .write(
                Method::POST,
                &format!("courses/{course_id}/enroll"),
                None,
                self.config.policy_for(DependencyTag::Enroll),
            )
            .await?;
        let record: EnrollRecord = if value.is_null() {
            EnrollRecord::default()
        } else {
            serde_json::from_value(value)?
        };
        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let mut config = MarketplaceConfig::default();
        config.api.base_url = "https://example.com/api/".into();
        let api = HttpMarketplaceApi::new(config).unwrap();
        assert_eq!(api.endpoint("/cart"), "https://example.com/api/cart");
        assert_eq!(api.endpoint("courses/7"), "https://example.com/api/courses/7");
    }

    #[test]
    fn test_rejects_non_http_base() {
        let mut config = MarketplaceConfig::default();
        config.api.base_url = "localhost:8000".into();
        assert!(matches!(
            HttpMarketplaceApi::new(config),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_token_from_config() {
        let mut config = MarketplaceConfig::default();
        config.api.bearer_token = Some("t".into());
        let api = HttpMarketplaceApi::new(config).unwrap();
        assert!(api.is_authenticated());
        assert!(!api.with_token(None).is_authenticated());
    }
}
