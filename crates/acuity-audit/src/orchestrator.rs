//! Scan session orchestration.
//!
//! Owns one browser instance lifecycle per scan attempt and drives the
//! stages strictly in order: launch, navigation, preparation, injection,
//! evaluation, teardown. Teardown runs on every exit path so no browser
//! process outlives its attempt.

use crate::basic;
use crate::error::{Result, ScanError};
use crate::injector::RuleEngineInjector;
use crate::rules;
use crate::runner::ScanRunner;
use crate::scroll::scroll_through_page;
use acuity_browser::{BrowserEngine, BrowserError, ScanPage};
use acuity_core::{AppConfig, AuditResult, ScanRequest};
use std::time::Duration;

/// Drives one scan attempt end to end against one URL.
pub struct ScanOrchestrator {
    config: AppConfig,
    injector: RuleEngineInjector,
}

impl ScanOrchestrator {
    /// Create an orchestrator for the given configuration.
    pub fn new(config: AppConfig) -> Result<Self> {
        let injector = RuleEngineInjector::new(&config.engine)?;
        Ok(Self { config, injector })
    }

    /// Run one scan attempt.
    ///
    /// The browser instance acquired here is released before this returns,
    /// whether the pipeline succeeded, failed at any stage, or timed out.
    pub async fn run_scan(&self, request: &ScanRequest) -> Result<AuditResult> {
        tracing::info!("starting scan attempt for {}", request.url);

        let engine = BrowserEngine::launch(&self.config.browser)
            .await
            .map_err(|e| ScanError::Launch(e.to_string()))?;

        let outcome = self.run_pipeline(&engine, request).await;

        // Unconditional teardown; shutdown logs its own failures so they
        // never mask the pipeline outcome.
        engine.shutdown().await;

        match &outcome {
            Ok(result) => tracing::info!(
                "scan attempt for {} finished with {} issues",
                request.url,
                result.summary.total_issues_count
            ),
            Err(e) => tracing::error!("scan attempt for {} failed: {}", request.url, e),
        }

        outcome
    }

    /// Stages between launch and teardown, strictly sequential.
    async fn run_pipeline(
        &self,
        engine: &BrowserEngine,
        request: &ScanRequest,
    ) -> Result<AuditResult> {
        let page = engine.open_page(&self.config.browser.user_agent).await?;

        self.navigate(&page, &request.url).await?;

        scroll_through_page(&page, &self.config.scroll).await;

        if self.injector.inject(&page).await? {
            rules::run_rule_engine(&page, &request.url).await
        } else {
            // Degraded evaluation, observable only in logs: the caller
            // still receives a structurally identical result.
            Ok(basic::evaluate(&page, &request.url).await)
        }
    }

    /// Navigate to the target and sanity-check the response.
    ///
    /// 5xx, 403 and 404 make the page pointless to audit and fail the
    /// attempt. A missing response status is tolerated. The follow-up
    /// load-settle wait is advisory only.
    async fn navigate(&self, page: &ScanPage, url: &str) -> Result<()> {
        let timeout = Duration::from_secs(self.config.scanning.navigation_timeout_secs);

        let status = page.navigate(url, timeout).await.map_err(|e| match e {
            BrowserError::Timeout(msg) | BrowserError::Navigation(msg) => {
                ScanError::Navigation(msg)
            }
            other => ScanError::Navigation(other.to_string()),
        })?;

        match status {
            Some(status) if status >= 500 || status == 403 || status == 404 => {
                return Err(ScanError::UnusableStatus { status });
            }
            Some(status) => tracing::debug!("navigation answered HTTP {}", status),
            None => tracing::warn!("no navigation response observed for {}, continuing", url),
        }

        let settle = Duration::from_secs(self.config.scanning.settle_timeout_secs);
        if let Err(e) = page.wait_settled(settle).await {
            tracing::warn!("load-settle wait did not complete, continuing: {}", e);
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl ScanRunner for ScanOrchestrator {
    async fn run_scan(&self, request: &ScanRequest) -> Result<AuditResult> {
        ScanOrchestrator::run_scan(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unusable_status_classification() {
        // Mirrors the match arms in navigate(): server errors plus the
        // two blocked/absent client codes are fatal, everything else is
        // acceptable, redirects included.
        let fatal = |status: i64| status >= 500 || status == 403 || status == 404;
        for status in [500, 502, 503, 403, 404] {
            assert!(fatal(status), "HTTP {status} should fail the attempt");
        }
        for status in [200, 201, 301, 302, 401, 418, 429] {
            assert!(!fatal(status), "HTTP {status} should be audited");
        }
    }

    #[test]
    fn test_orchestrator_construction() {
        let orchestrator = ScanOrchestrator::new(AppConfig::default());
        assert!(orchestrator.is_ok());
    }
}
