use acuity_audit::error::Result as ScanResult;
use acuity_audit::{ScanOrchestrator, ScanRunner};
use acuity_core::{AppConfig, AuditResult, ScanRequest};
use acuity_queue::AuditQueue;
use acuity_service::{AuditRequest, AuditService, ResultSink, ServiceError};
use std::sync::{Arc, Mutex};

struct EchoRunner;

#[async_trait::async_trait]
impl ScanRunner for EchoRunner {
    async fn run_scan(&self, request: &ScanRequest) -> ScanResult<AuditResult> {
        Ok(AuditResult::new(request.url.clone(), Vec::new(), 3, 0))
    }
}

struct RecordingSink {
    seen: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ResultSink for RecordingSink {
    async fn store(&self, result: &AuditResult) -> acuity_service::sink::SinkResult {
        self.seen.lock().unwrap().push(result.summary.url.clone());
        Ok(())
    }
}

fn service() -> AuditService<EchoRunner> {
    let queue = AuditQueue::new(EchoRunner, 2);
    AuditService::new(queue, &AppConfig::default()).expect("service")
}

#[tokio::test]
async fn test_malformed_url_rejected_before_any_scan() {
    let result = service().handle(AuditRequest::for_url("https://")).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_bad_email_rejected_before_any_scan() {
    let mut request = AuditRequest::for_url("example.com");
    request.email = Some("nope".to_string());
    let result = service().handle(request).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_error_body_is_generic_by_default() {
    let svc = service();
    let err = ServiceError::Internal("secret stack detail".to_string());
    let body = svc.error_body(&err);
    assert!(!body.error.contains("secret"));
    assert!(body.details.is_none());
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_reachable_precheck_against_live_site() {
    let svc = service();
    let response = svc
        .handle(AuditRequest::for_url("example.com"))
        .await
        .expect("audit response");
    assert!(response.success);
    assert_eq!(response.url, "https://example.com");
    assert_eq!(response.results.summary.passed_rules_count, 3);
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_url_existence_probe() {
    let svc = service();
    assert!(svc.check_url_exists("example.com").await);
    assert!(!svc.check_url_exists("this-domain-does-not-exist-acuity.invalid").await);
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed and network access
async fn test_end_to_end_audit_with_sink() {
    let config = AppConfig::default();
    let orchestrator = ScanOrchestrator::new(config.clone()).expect("orchestrator");
    let queue = AuditQueue::new(orchestrator, config.scanning.max_concurrent);

    let sink = Arc::new(RecordingSink {
        seen: Mutex::new(Vec::new()),
    });
    let service = AuditService::new(queue, &config)
        .expect("service")
        .with_sink(sink.clone());

    let response = service
        .handle(AuditRequest::for_url("https://example.com"))
        .await
        .expect("audit response");

    assert!(response.success);
    let summary = &response.results.summary;
    assert_eq!(
        summary.total_issues_count,
        summary.critical_count
            + summary.serious_count
            + summary.moderate_count
            + summary.minor_count
    );

    // The sink is fire-and-forget; give it a beat.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(sink.seen.lock().unwrap().as_slice(), ["https://example.com"]);
}
