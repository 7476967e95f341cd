//! URL 验证模块
//!
//! Only syntax is checked: a candidate is valid when it parses as an absolute
//! URL. Scheme and host are not restricted.

use url::Url;

/// URL 验证错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// Parses `url` as an absolute URL.
///
/// Relative references such as `/path` or `example.com` fail because they
/// have no scheme.
pub fn validate_url(url: &str) -> Result<Url, UrlValidationError> {
    if url.trim().is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))
}

pub fn is_valid_url(url: &str) -> bool {
    validate_url(url).is_ok()
}
