//! The seam between admission control and the scan pipeline.

use crate::error::Result;
use acuity_core::{AuditResult, ScanRequest};

/// Anything that can execute one scan attempt for a request.
///
/// The job queue is generic over this trait so its admission behavior can
/// be tested without launching browsers.
#[async_trait::async_trait]
pub trait ScanRunner: Send + Sync {
    /// Run one end-to-end scan attempt.
    async fn run_scan(&self, request: &ScanRequest) -> Result<AuditResult>;
}

#[async_trait::async_trait]
impl<T: ScanRunner + ?Sized> ScanRunner for std::sync::Arc<T> {
    async fn run_scan(&self, request: &ScanRequest) -> Result<AuditResult> {
        (**self).run_scan(request).await
    }
}
