//! Page handle wrapper with audit-oriented navigation and evaluation.

use crate::error::{BrowserError, Result};
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures_util::stream::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// How long to wait for the main-document response event after a
/// navigation completes. The event has normally already arrived by then.
const STATUS_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// A page handle owned by a single scan attempt.
///
/// All in-page script runs go through [`ScanPage::evaluate`] so promise
/// awaiting and by-value return are handled uniformly.
pub struct ScanPage {
    page: Page,
}

impl ScanPage {
    pub(crate) fn new(page: Page) -> Self {
        Self { page }
    }

    /// Access the underlying chromiumoxide page.
    #[must_use]
    pub fn inner(&self) -> &Page {
        &self.page
    }

    /// Navigate to `url` with a hard timeout.
    ///
    /// Returns the HTTP status of the main document response when one was
    /// observed. Untrusted pages sometimes produce no observable response
    /// object; callers must tolerate `None`.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<Option<i64>> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!("navigation to {url} exceeded {timeout:?}"))
            })?
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        // The document response event was emitted during navigation; drain
        // the listener briefly to pick it up.
        let status = tokio::time::timeout(STATUS_DRAIN_TIMEOUT, async {
            while let Some(event) = responses.next().await {
                if event.r#type == ResourceType::Document {
                    return Some(event.response.status);
                }
            }
            None
        })
        .await
        .unwrap_or(None);

        Ok(status)
    }

    /// Wait for the page's load state to settle.
    ///
    /// Advisory: callers log a failure here and proceed with the scan.
    pub async fn wait_settled(&self, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.page.wait_for_navigation())
            .await
            .map_err(|_| BrowserError::Timeout(format!("load-settle wait exceeded {timeout:?}")))?
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        Ok(())
    }

    /// Evaluate a script expression in the page and deserialize its value.
    ///
    /// Promises are awaited, so expressions may be async.
    pub async fn evaluate<T: DeserializeOwned>(&self, expression: impl Into<String>) -> Result<T> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::Evaluation)?;

        let result = self
            .page
            .evaluate(params)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| BrowserError::Evaluation(e.to_string()))
    }

    /// Evaluate a script expression for its side effects only.
    pub async fn execute(&self, expression: impl Into<String>) -> Result<()> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .build()
            .map_err(BrowserError::Evaluation)?;

        self.page
            .evaluate(params)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        Ok(())
    }
}
