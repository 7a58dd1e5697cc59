//! Retry policies for fetch operations.

use std::time::Duration;

use crate::{DependencyTag, FetchError};

/// Shortest attempt a budgeted read policy will schedule.
pub const MIN_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(500);

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let multiplier = 2u32.saturating_pow(attempt);
                base.saturating_mul(multiplier).min(*max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            max: Duration::from_millis(2000),
        }
    }
}

/// Conditions that trigger a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCondition {
    /// Retry on specific HTTP status code.
    StatusCode(u16),
    /// Retry on any 5xx status.
    ServerError,
    /// Retry on timeout.
    Timeout,
    /// Retry on connection error.
    ConnectionError,
}

impl RetryCondition {
    /// Check if an error matches this condition.
    pub fn matches(&self, err: &FetchError) -> bool {
        match (self, err) {
            (Self::StatusCode(code), FetchError::Http { status, .. }) => status == code,
            (Self::ServerError, FetchError::Http { status, .. }) => (500..600).contains(status),
            (Self::Timeout, FetchError::Timeout(_)) => true,
            (Self::ConnectionError, FetchError::Connection(_)) => true,
            _ => false,
        }
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first try.
    pub max_attempts: u32,
    /// Backoff strategy.
    pub backoff: BackoffStrategy,
    /// Conditions that trigger retry.
    pub retry_on: Vec<RetryCondition>,
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: BackoffStrategy::default(),
            retry_on: vec![
                RetryCondition::ServerError,
                RetryCondition::StatusCode(429),
                RetryCondition::Timeout,
                RetryCondition::ConnectionError,
            ],
        }
    }

    /// Create a policy with no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            backoff: BackoffStrategy::None,
            retry_on: Vec::new(),
        }
    }

    /// Set backoff strategy.
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Sum of the delays slept before every retry.
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_attempts)
            .map(|attempt| self.backoff.delay_for_attempt(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Check if `err` on attempt `attempt` (0-indexed) should be retried.
    pub fn should_retry(&self, err: &FetchError, attempt: u32) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        self.retry_on.iter().any(|c| c.matches(err))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Fetch policy combining timeout and retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Per-attempt timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl FetchPolicy {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }

    /// Create from a dependency tag's defaults.
    pub fn from_tag(tag: DependencyTag) -> Self {
        Self {
            timeout: tag.default_timeout(),
            retry: RetryPolicy::new(tag.default_max_retries()),
        }
    }

    /// A read policy whose attempts and backoff fit inside `budget`.
    ///
    /// The budget left after backoff is split evenly across attempts.
    /// Retries are dropped until each attempt gets at least
    /// [`MIN_ATTEMPT_TIMEOUT`].
    pub fn within(budget: Duration, mut retry: RetryPolicy) -> Self {
        loop {
            if let Some(remaining) = budget.checked_sub(retry.total_backoff()) {
                let timeout = remaining / (retry.max_attempts + 1);
                if retry.max_attempts == 0 || timeout >= MIN_ATTEMPT_TIMEOUT {
                    return Self { timeout, retry };
                }
            }
            retry.max_attempts -= 1;
        }
    }

    /// Longest a read under this policy can take, every attempt timing out.
    pub fn worst_case(&self) -> Duration {
        self.timeout
            .saturating_mul(self.retry.max_attempts + 1)
            .saturating_add(self.retry.total_backoff())
    }

    /// Policy for a write. Writes are never retried.
    pub fn write(timeout: Duration) -> Self {
        Self {
            timeout,
            retry: RetryPolicy::none(),
        }
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::from_tag(DependencyTag::Course)
    }
}
