//! The seam to the external persistence/summarization collaborator.

use acuity_core::AuditResult;

/// Result type for sink operations; the concrete error never matters to
/// the audit flow.
pub type SinkResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Consumes finished audit results, e.g. for storage or AI-generated
/// summaries.
///
/// The service hands results over fire-and-forget: a sink failure is
/// logged and never affects the response to the submitter.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    /// Store or forward one finished audit result.
    async fn store(&self, result: &AuditResult) -> SinkResult;
}
