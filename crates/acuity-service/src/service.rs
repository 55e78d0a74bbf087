//! The audit service: the one inbound operation, end to end.

use crate::error::{ErrorBody, Result, ServiceError};
use crate::precheck;
use crate::request::{self, AuditRequest};
use crate::sink::ResultSink;
use acuity_audit::ScanRunner;
use acuity_core::config::ScanningConfig;
use acuity_core::{AppConfig, AuditResult, ScanRequest};
use acuity_queue::AuditQueue;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Successful response to an audit submission.
#[derive(Debug, Clone, Serialize)]
pub struct AuditResponse {
    /// Always true; failures travel as [`ErrorBody`]
    pub success: bool,
    /// The normalized URL that was audited
    pub url: String,
    /// Submitter email, echoed back when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Submitter name, echoed back when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The audit report
    pub results: AuditResult,
}

/// Outward-facing audit service.
///
/// Validates, pre-checks, submits to the bounded queue with the fixed
/// retry policy, and shapes responses. Constructed once per process and
/// handed to whatever transport layer fronts it.
pub struct AuditService<R> {
    queue: AuditQueue<R>,
    http: Client,
    scanning: ScanningConfig,
    diagnostics: bool,
    sink: Option<Arc<dyn ResultSink>>,
}

impl<R: ScanRunner + 'static> AuditService<R> {
    /// Create a service in front of `queue`.
    pub fn new(queue: AuditQueue<R>, config: &AppConfig) -> Result<Self> {
        let http = precheck::build_client(config.service.precheck_timeout_secs)?;
        Ok(Self {
            queue,
            http,
            scanning: config.scanning.clone(),
            diagnostics: config.service.diagnostics,
            sink: None,
        })
    }

    /// Attach the external persistence/summarization sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Handle one "audit this URL" submission.
    pub async fn handle(&self, request: AuditRequest) -> Result<AuditResponse> {
        let target = request::validate(&request)?;

        // Reject dead targets before a browser slot is ever spent.
        precheck::check_reachable(&self.http, &target).await?;

        let results = submit_with_retries(
            &self.queue,
            &target,
            self.scanning.max_attempts,
            Duration::from_millis(self.scanning.retry_delay_ms),
        )
        .await?;

        if let Some(sink) = &self.sink {
            let sink = Arc::clone(sink);
            let stored = results.clone();
            tokio::spawn(async move {
                if let Err(e) = sink.store(&stored).await {
                    tracing::warn!("result sink failed: {}", e);
                }
            });
        }

        Ok(AuditResponse {
            success: true,
            url: target,
            email: request.email,
            name: request.name,
            results,
        })
    }

    /// Probe whether anything answers at the given address.
    pub async fn check_url_exists(&self, raw_url: &str) -> bool {
        precheck::check_url_exists(&self.http, raw_url).await
    }

    /// Render a service error for the rendering layer, honoring the
    /// configured diagnostics setting.
    #[must_use]
    pub fn error_body(&self, error: &ServiceError) -> ErrorBody {
        ErrorBody::from_error(error, self.diagnostics)
    }
}

/// Submit to the queue, retrying whole attempts up to `max_attempts`.
///
/// Each retry is a brand-new submission: a fresh queue entry and a fresh
/// scan session, never a resumption.
async fn submit_with_retries<R: ScanRunner + 'static>(
    queue: &AuditQueue<R>,
    url: &str,
    max_attempts: u32,
    delay: Duration,
) -> Result<AuditResult> {
    let attempts = max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match queue.submit(ScanRequest::new(url)).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!("audit of {} succeeded on attempt {}", url, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                tracing::warn!("attempt {}/{} for {} failed: {}", attempt, attempts, url, e);
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(ServiceError::ScanFailed {
        attempts,
        source: last_error.unwrap_or(acuity_audit::ScanError::Interrupted),
    })
}
