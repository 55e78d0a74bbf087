//! Inbound request validation.

use crate::error::{Result, ServiceError};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Minimum length for the optional submitter name.
const MIN_NAME_LEN: usize = 2;

/// One inbound "audit this URL" request.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditRequest {
    /// The URL to audit; scheme may be omitted and defaults to https
    pub url: String,
    /// Optional contact email of the submitter
    #[serde(default)]
    pub email: Option<String>,
    /// Optional name of the submitter
    #[serde(default)]
    pub name: Option<String>,
}

impl AuditRequest {
    /// Convenience constructor for a bare URL submission.
    #[must_use]
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            email: None,
            name: None,
        }
    }
}

/// Prepend `https://` when the submitted URL carries no scheme.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Validate a request and return the normalized target URL.
///
/// Rejections here are input errors: they never reach the pre-check or
/// the queue.
pub fn validate(request: &AuditRequest) -> Result<String> {
    let normalized = normalize_url(&request.url);

    let parsed = url::Url::parse(&normalized)
        .map_err(|e| ServiceError::InvalidInput(format!("invalid URL: {e}")))?;
    if parsed.host_str().is_none() {
        return Err(ServiceError::InvalidInput(
            "URL must name a host".to_string(),
        ));
    }

    if let Some(email) = &request.email {
        if !email_regex().is_match(email) {
            return Err(ServiceError::InvalidInput(
                "invalid email address".to_string(),
            ));
        }
    }

    if let Some(name) = &request.name {
        if name.trim().chars().count() < MIN_NAME_LEN {
            return Err(ServiceError::InvalidInput("name is too short".to_string()));
        }
    }

    Ok(normalized)
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_https_scheme() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("  example.com/page "), "https://example.com/page");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_validate_accepts_bare_domain() {
        let request = AuditRequest::for_url("example.com");
        assert_eq!(validate(&request).unwrap(), "https://example.com");
    }

    #[test]
    fn test_validate_rejects_garbage_url() {
        // Normalization makes these parse as host-less or invalid URLs
        for bad in ["https://", "ht tp://x", ""] {
            let request = AuditRequest::for_url(bad);
            assert!(validate(&request).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_validate_email() {
        let mut request = AuditRequest::for_url("example.com");
        request.email = Some("user@example.com".to_string());
        assert!(validate(&request).is_ok());

        request.email = Some("not-an-email".to_string());
        assert!(matches!(
            validate(&request),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_name_length() {
        let mut request = AuditRequest::for_url("example.com");
        request.name = Some("Jo".to_string());
        assert!(validate(&request).is_ok());

        request.name = Some("J".to_string());
        assert!(validate(&request).is_err());

        request.name = Some("  J  ".to_string());
        assert!(validate(&request).is_err(), "whitespace padding must not count");
    }
}
