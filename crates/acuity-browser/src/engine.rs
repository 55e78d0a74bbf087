//! Scan-scoped browser instance lifecycle.

use crate::error::{BrowserError, Result};
use crate::page::ScanPage;
use acuity_core::config::BrowserConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures_util::stream::StreamExt;
use tokio::task::JoinHandle;

/// Launch arguments for constrained server environments. Sandboxing is
/// disabled because the features it needs are unavailable there, and the
/// shared-memory and GPU paths are cut down to keep the per-instance
/// footprint small.
const LAUNCH_ARGS: &[&str] = &[
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
];

/// One headless browser instance, exclusively owned by one scan attempt.
///
/// Created at the start of an attempt and shut down before the attempt's
/// result is reported, on every exit path.
pub struct BrowserEngine {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch an isolated browser instance.
    ///
    /// A failure here is fatal to the scan attempt that requested it.
    pub async fn launch(settings: &BrowserConfig) -> Result<Self> {
        let viewport = Viewport {
            width: settings.viewport_width,
            height: settings.viewport_height,
            ..Viewport::default()
        };

        let mut builder = ChromiumConfig::builder()
            .no_sandbox()
            .viewport(viewport)
            .args(LAUNCH_ARGS.iter().copied());
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // Drain CDP events for the lifetime of the instance.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Open a fresh page with the configured user agent.
    pub async fn open_page(&self, user_agent: &str) -> Result<ScanPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        page.set_user_agent(user_agent)
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        Ok(ScanPage::new(page))
    }

    /// Close the browser instance, releasing its OS process.
    ///
    /// Never fails: a close error must not mask the scan attempt's real
    /// outcome, so it is logged and swallowed here.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("failed to close browser cleanly: {}", e);
        }
        self.handler_task.abort();
    }
}
