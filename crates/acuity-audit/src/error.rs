//! Error type for scan attempts.
//!
//! One descriptive error per attempt: whichever stage fails first becomes
//! the attempt's error, reported after browser teardown completes.

use acuity_browser::BrowserError;
use thiserror::Error;

/// Error carried by a failed scan attempt.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Could not start a browser instance; fatal to the attempt.
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Navigation to the target URL failed or timed out.
    #[error("failed to load page: {0}")]
    Navigation(String),

    /// The target answered with a status that makes auditing meaningless.
    #[error("target page unusable: HTTP status {status}")]
    UnusableStatus {
        /// The offending HTTP status code
        status: i64,
    },

    /// The rule engine bundle could not be fetched from its CDN.
    #[error("rule engine bundle fetch failed: {0}")]
    BundleFetch(String),

    /// The rule engine errored while evaluating the page.
    #[error("rule evaluation failed: {0}")]
    Evaluation(String),

    /// A browser-level operation failed mid-pipeline.
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// The attempt's result channel was dropped before completion.
    #[error("scan attempt was interrupted before completion")]
    Interrupted,
}

/// Result type alias using `ScanError`.
pub type Result<T> = std::result::Result<T, ScanError>;
