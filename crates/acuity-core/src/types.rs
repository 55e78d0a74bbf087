//! The audit data model shared across the Acuity crates.
//!
//! These types mirror the JSON shape produced by the in-page rule engine,
//! so the engine's raw output deserializes directly into [`RuleViolation`]
//! values and everything downstream (summary, service response) works the
//! same whether the violations came from the engine or the basic fallback
//! checks.

use crate::error::AcuityError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single URL-scan request as accepted by the job queue.
///
/// Immutable once created; the queue entry that wraps it owns it until
/// the request is dequeued and handed to a scan attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// The absolute URL to audit. Validation happens at the service
    /// boundary before a request is ever constructed.
    pub url: String,
    /// When the request was submitted.
    #[serde(rename = "submittedAt")]
    pub submitted_at: Timestamp,
}

impl ScanRequest {
    /// Create a new scan request stamped with the current time.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            submitted_at: Timestamp::now(),
        }
    }
}

/// Severity bucket of a rule violation.
///
/// Matches the impact levels reported by the rule engine. `None` is what
/// the engine reports for rules that carry no impact classification;
/// occurrences at that level are excluded from the summary buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks access for affected users entirely
    Critical,
    /// Serious barrier for affected users
    Serious,
    /// Noticeable barrier with workarounds
    Moderate,
    /// Minor inconvenience
    Minor,
    /// No impact classification
    None,
}

/// One concrete DOM element instance matching a violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationNode {
    /// Outer HTML snippet of the offending element
    pub html: String,
    /// Locator for the element (CSS selector chain or equivalent)
    #[serde(default)]
    pub target: Vec<String>,
    /// Human-readable explanation of why the element fails the rule
    #[serde(default)]
    pub failure_summary: String,
}

/// A single accessibility rule violation with its occurrences.
///
/// Read-only once produced, whether by the rule engine or the basic
/// fallback evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleViolation {
    /// Stable rule identifier (e.g. `image-alt`)
    pub id: String,
    /// Severity bucket; `None` in JSON when the engine reports no impact
    #[serde(default)]
    pub impact: Option<Severity>,
    /// What the rule checks
    pub description: String,
    /// Short remediation guidance
    pub help: String,
    /// Link to the full rule documentation
    #[serde(default)]
    pub help_url: String,
    /// One entry per offending element
    pub nodes: Vec<ViolationNode>,
}

impl RuleViolation {
    /// Number of concrete occurrences of this violation.
    #[must_use]
    pub fn occurrence_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Per-severity occurrence counts derived from a set of violations.
///
/// Invariant: `total_issues_count` equals the sum of the four severity
/// buckets. Occurrences whose violation carries no severity are not
/// counted in any bucket or in the total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    /// The audited URL
    pub url: String,
    /// Total occurrences across the four severity buckets
    pub total_issues_count: u32,
    /// Occurrences at critical severity
    pub critical_count: u32,
    /// Occurrences at serious severity
    pub serious_count: u32,
    /// Occurrences at moderate severity
    pub moderate_count: u32,
    /// Occurrences at minor severity
    pub minor_count: u32,
    /// Rules that ran and found nothing
    pub passed_rules_count: u32,
    /// Rules that could not be conclusively evaluated
    pub incomplete_rules_count: u32,
    /// When the audit finished
    pub timestamp: Timestamp,
}

impl AuditSummary {
    /// Derive a summary from a set of violations.
    ///
    /// Counts one unit per occurrence (node), bucketed by the owning
    /// violation's severity. `passed` and `incomplete` are reported by
    /// the evaluator that produced the violations.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_violations(
        url: impl Into<String>,
        violations: &[RuleViolation],
        passed: u32,
        incomplete: u32,
    ) -> Self {
        let mut critical = 0u32;
        let mut serious = 0u32;
        let mut moderate = 0u32;
        let mut minor = 0u32;

        for violation in violations {
            let occurrences = violation.occurrence_count() as u32;
            match violation.impact {
                Some(Severity::Critical) => critical += occurrences,
                Some(Severity::Serious) => serious += occurrences,
                Some(Severity::Moderate) => moderate += occurrences,
                Some(Severity::Minor) => minor += occurrences,
                Some(Severity::None) | None => {}
            }
        }

        Self {
            url: url.into(),
            total_issues_count: critical + serious + moderate + minor,
            critical_count: critical,
            serious_count: serious,
            moderate_count: moderate,
            minor_count: minor,
            passed_rules_count: passed,
            incomplete_rules_count: incomplete,
            timestamp: Timestamp::now(),
        }
    }
}

/// Terminal output of one scan attempt. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    /// Aggregated per-severity counts
    pub summary: AuditSummary,
    /// The full violation list the summary was derived from
    pub violations: Vec<RuleViolation>,
}

impl AuditResult {
    /// Build a result from violations, deriving the summary.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        violations: Vec<RuleViolation>,
        passed: u32,
        incomplete: u32,
    ) -> Self {
        let summary = AuditSummary::from_violations(url, &violations, passed, incomplete);
        Self {
            summary,
            violations,
        }
    }
}

/// RFC3339 UTC timestamp newtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, AcuityError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| AcuityError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(impact: Option<Severity>, occurrences: usize) -> RuleViolation {
        RuleViolation {
            id: "test-rule".to_string(),
            impact,
            description: "test".to_string(),
            help: "test".to_string(),
            help_url: String::new(),
            nodes: (0..occurrences)
                .map(|i| ViolationNode {
                    html: format!("<div id=\"{i}\"></div>"),
                    target: vec![format!("#{i}")],
                    failure_summary: "fails".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_summary_empty_violations() {
        let summary = AuditSummary::from_violations("https://example.com", &[], 5, 1);
        assert_eq!(summary.total_issues_count, 0);
        assert_eq!(summary.critical_count, 0);
        assert_eq!(summary.serious_count, 0);
        assert_eq!(summary.moderate_count, 0);
        assert_eq!(summary.minor_count, 0);
        assert_eq!(summary.passed_rules_count, 5);
        assert_eq!(summary.incomplete_rules_count, 1);
    }

    #[test]
    fn test_summary_bucket_invariant() {
        let violations = vec![
            violation(Some(Severity::Critical), 2),
            violation(Some(Severity::Serious), 3),
            violation(Some(Severity::Moderate), 1),
            violation(Some(Severity::Minor), 4),
        ];
        let summary = AuditSummary::from_violations("https://example.com", &violations, 0, 0);
        assert_eq!(summary.critical_count, 2);
        assert_eq!(summary.serious_count, 3);
        assert_eq!(summary.moderate_count, 1);
        assert_eq!(summary.minor_count, 4);
        assert_eq!(
            summary.total_issues_count,
            summary.critical_count
                + summary.serious_count
                + summary.moderate_count
                + summary.minor_count
        );
    }

    #[test]
    fn test_summary_excludes_unclassified_impact() {
        let violations = vec![
            violation(Some(Severity::Serious), 1),
            violation(Some(Severity::None), 3),
            violation(None, 2),
        ];
        let summary = AuditSummary::from_violations("https://example.com", &violations, 0, 0);
        assert_eq!(summary.serious_count, 1);
        assert_eq!(summary.total_issues_count, 1);
    }

    #[test]
    fn test_violation_deserializes_engine_json() {
        // Shape as emitted by the rule engine, including fields we ignore.
        let json = r#"{
            "id": "image-alt",
            "impact": "critical",
            "description": "Images must have alternate text",
            "help": "Images must have alternate text",
            "helpUrl": "https://dequeuniversity.com/rules/axe/4.10/image-alt",
            "tags": ["wcag2a"],
            "nodes": [{
                "html": "<img src=\"a.png\">",
                "target": ["img"],
                "failureSummary": "Fix any of the following: missing alt",
                "any": [],
                "all": [],
                "none": []
            }]
        }"#;
        let violation: RuleViolation = serde_json::from_str(json).expect("engine JSON");
        assert_eq!(violation.id, "image-alt");
        assert_eq!(violation.impact, Some(Severity::Critical));
        assert_eq!(violation.nodes.len(), 1);
        assert!(violation.nodes[0].failure_summary.contains("missing alt"));
    }

    #[test]
    fn test_violation_tolerates_null_impact() {
        let json = r#"{
            "id": "region",
            "impact": null,
            "description": "d",
            "help": "h",
            "helpUrl": "",
            "nodes": []
        }"#;
        let violation: RuleViolation = serde_json::from_str(json).expect("null impact");
        assert_eq!(violation.impact, None);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = AuditSummary::from_violations("https://example.com", &[], 3, 0);
        let json = serde_json::to_value(&summary).expect("serialize");
        assert!(json.get("totalIssuesCount").is_some());
        assert!(json.get("passedRulesCount").is_some());
        assert!(json.get("incompleteRulesCount").is_some());
        assert!(json.get("total_issues_count").is_none());
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = Timestamp::now();
        let s = ts.to_rfc3339();
        let parsed = Timestamp::from_rfc3339(&s).expect("parse RFC3339 timestamp");
        assert_eq!(ts.timestamp(), parsed.timestamp());
    }

    #[test]
    fn test_timestamp_invalid() {
        assert!(Timestamp::from_rfc3339("not a timestamp").is_err());
    }

    #[test]
    fn test_scan_request_carries_url() {
        let request = ScanRequest::new("https://example.com");
        assert_eq!(request.url, "https://example.com");
    }
}
