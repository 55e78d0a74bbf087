//! Reachability pre-check: a lightweight probe issued before a scan is
//! ever queued, so obviously dead or blocked targets never cost a
//! browser launch.

use crate::error::{Result, ServiceError};
use crate::request::normalize_url;
use acuity_core::DEFAULT_USER_AGENT;
use reqwest::Client;
use std::time::Duration;

/// Build the probe client: short timeout, browser-like identity.
///
/// Some servers answer GET but mishandle HEAD, so the reachability probe
/// uses GET; the existence probe stays on HEAD since a body is useless
/// there anyway.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|e| ServiceError::Internal(format!("failed to create HTTP client: {e}")))
}

/// Whether a pre-check status means the page can be meaningfully audited.
///
/// Client responses count as reachable except 403 and 404, which signal
/// the page is blocked or absent.
#[must_use]
pub fn is_reachable_status(status: u16) -> bool {
    (200..500).contains(&status) && status != 403 && status != 404
}

/// Probe the target with a GET and classify the response.
pub async fn check_reachable(client: &Client, url: &str) -> Result<()> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ServiceError::PrecheckTimeout
        } else {
            ServiceError::Unreachable(e.to_string())
        }
    })?;

    let status = response.status().as_u16();
    if is_reachable_status(status) {
        tracing::debug!("pre-check for {} answered HTTP {}", url, status);
        Ok(())
    } else {
        Err(ServiceError::UnreachableStatus(status))
    }
}

/// Standalone existence probe: does anything answer at this address?
///
/// Follows redirects and treats any success status as existence; a
/// connection failure is simply "no".
pub async fn check_url_exists(client: &Client, raw_url: &str) -> bool {
    let url = normalize_url(raw_url);
    match client.head(&url).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::debug!("existence probe for {} failed: {}", url, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reachable_status_range() {
        for status in [200, 204, 301, 302, 400, 401, 418, 429, 499] {
            assert!(is_reachable_status(status), "HTTP {status} should pass");
        }
        for status in [403, 404, 500, 502, 503, 100, 199] {
            assert!(!is_reachable_status(status), "HTTP {status} should reject");
        }
    }

    #[test]
    fn test_client_builds() {
        assert!(build_client(10).is_ok());
    }
}
