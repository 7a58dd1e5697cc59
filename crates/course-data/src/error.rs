//! Fetch and configuration errors.

use course_commerce::parse::ParseError;
use course_commerce::CommerceError;

/// Error type for fetch operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The resource already exists (HTTP 409).
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// The resource doesn't exist (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The session is missing or expired (HTTP 401/403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        if err.is_timeout() {
            Self::Timeout(url)
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                url,
            }
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_decode() {
            Self::Deserialization(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

impl From<FetchError> for CommerceError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Deserialization(msg) => CommerceError::Parse(ParseError::Json(msg)),
            FetchError::Http { status: 401 | 403, .. } => CommerceError::AuthenticationRequired,
            other => CommerceError::Network(other.to_string()),
        }
    }
}

/// Error loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for CommerceError {
    fn from(err: ConfigError) -> Self {
        CommerceError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_detection() {
        let err = FetchError::Http {
            status: 409,
            url: "/cart".into(),
        };
        assert!(err.is_conflict());
        assert!(!FetchError::Timeout("/cart".into()).is_conflict());
        assert!(!err.is_not_found());

        let missing = FetchError::Http {
            status: 404,
            url: "/cart/7".into(),
        };
        assert!(missing.is_not_found());
    }

    #[test]
    fn test_into_commerce_error() {
        let err: CommerceError = FetchError::Timeout("/wishlist".into()).into();
        assert!(matches!(err, CommerceError::Network(_)));

        let err: CommerceError = FetchError::Http {
            status: 401,
            url: "/cart".into(),
        }
        .into();
        assert_eq!(err, CommerceError::AuthenticationRequired);

        let err: CommerceError = FetchError::Deserialization("eof".into()).into();
        assert!(err.notice().is_none());
    }
}
