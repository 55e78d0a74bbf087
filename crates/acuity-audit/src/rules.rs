//! Rule engine execution against the prepared page.

use crate::error::{Result, ScanError};
use acuity_browser::ScanPage;
use acuity_core::{AuditResult, RuleViolation};
use serde::Deserialize;

/// Rule-tag categories the audit is restricted to: WCAG 2.0/2.1/2.2
/// levels A and AA, vendor best practices, and Section 508.
pub const RULE_TAGS: [&str; 8] = [
    "wcag2a",
    "wcag2aa",
    "wcag21a",
    "wcag21aa",
    "wcag22a",
    "wcag22aa",
    "best-practice",
    "section508",
];

/// Expression probing whether the engine's entry point is reachable in
/// the page's global scope.
pub(crate) const ENGINE_READY_PROBE: &str = "typeof window.axe !== 'undefined'";

/// Slimmed engine output: the full violation objects plus counts of rules
/// that passed or came back inconclusive.
#[derive(Debug, Deserialize)]
struct EngineRun {
    violations: Vec<RuleViolation>,
    passes: u32,
    incomplete: u32,
}

/// Run the injected rule engine and aggregate its findings.
///
/// Fails the attempt if the engine itself errors while evaluating; the
/// engine being absent is the injector's concern, not this function's.
pub async fn run_rule_engine(page: &ScanPage, url: &str) -> Result<AuditResult> {
    let expression = run_expression();

    let run: EngineRun = page
        .evaluate(expression)
        .await
        .map_err(|e| ScanError::Evaluation(e.to_string()))?;

    tracing::debug!(
        "rule engine finished: {} violations, {} passes, {} incomplete",
        run.violations.len(),
        run.passes,
        run.incomplete
    );

    Ok(AuditResult::new(url, run.violations, run.passes, run.incomplete))
}

/// Build the in-page expression that runs the engine restricted to
/// [`RULE_TAGS`] and projects its result to what we deserialize.
fn run_expression() -> String {
    // RULE_TAGS serializes as a JSON array, which is valid JS.
    let tags = serde_json::to_string(&RULE_TAGS).unwrap_or_else(|_| "[]".to_string());
    format!(
        "window.axe.run(document, {{ runOnly: {{ type: 'tag', values: {tags} }} }}) \
           .then(r => ({{ \
              violations: r.violations, \
              passes: r.passes.length, \
              incomplete: r.incomplete.length \
           }}))"
    )
}
