//! Service-level errors and their user-visible rendering.
//!
//! Internally every failure keeps its full cause chain for logs. What
//! crosses the boundary to an end user is a generic message; detailed
//! causes are attached only when diagnostics are enabled.

use acuity_audit::ScanError;
use serde::Serialize;
use thiserror::Error;

/// Error produced by the outward-facing audit service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed request data; never reaches the queue.
    #[error("invalid request: {0}")]
    InvalidInput(String),

    /// The pre-check answered a status outside the auditable range.
    #[error("target URL is not reachable: HTTP {0}")]
    UnreachableStatus(u16),

    /// The pre-check could not connect at all.
    #[error("could not connect to target URL: {0}")]
    Unreachable(String),

    /// The pre-check ran out of time.
    #[error("timed out while checking target URL")]
    PrecheckTimeout,

    /// Every end-to-end attempt failed.
    #[error("audit failed after {attempts} attempts")]
    ScanFailed {
        /// How many attempts were made
        attempts: u32,
        /// The last attempt's error
        #[source]
        source: ScanError,
    },

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// The message an end user sees.
    ///
    /// Input and reachability problems are the user's to fix, so those
    /// are spelled out. Scan and internal failures get the apology.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(reason) => format!("Invalid request: {reason}"),
            Self::UnreachableStatus(status) => {
                format!("The URL is not reachable (HTTP {status}). Please verify the address.")
            }
            Self::Unreachable(_) => {
                "We could not connect to the URL. Please verify the address.".to_string()
            }
            Self::PrecheckTimeout => {
                "Checking the URL took too long. Please try again later.".to_string()
            }
            Self::ScanFailed { .. } | Self::Internal(_) => {
                "We could not complete the audit. Please try again later or contact us directly."
                    .to_string()
            }
        }
    }

    /// The full cause chain, for diagnostics.
    #[must_use]
    pub fn detail(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Serializable error payload handed to the rendering layer.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Generic user-facing message
    pub error: String,
    /// Full cause chain, present only when diagnostics are enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Render an error for the outside world.
    #[must_use]
    pub fn from_error(error: &ServiceError, diagnostics: bool) -> Self {
        Self {
            error: error.public_message(),
            details: diagnostics.then(|| error.detail()),
        }
    }
}

/// Result type alias using `ServiceError`.
pub type Result<T> = std::result::Result<T, ServiceError>;
