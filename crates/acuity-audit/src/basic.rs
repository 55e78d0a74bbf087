//! Basic rule evaluator: the fallback checklist used when the rule
//! engine cannot be injected.
//!
//! Inspects rendered DOM state directly through three fixed checks and
//! produces the same result shape as the engine, so callers downstream
//! never need to care which evaluator ran.

use acuity_browser::{BrowserError, ScanPage};
use acuity_core::{AuditResult, RuleViolation, Severity, ViolationNode};
use serde::Deserialize;

/// Number of fixed checks this evaluator knows.
pub const BASIC_CHECK_COUNT: u32 = 3;

/// Images lacking a non-empty alternative-text attribute.
const IMAGE_CHECK: &str = "\
  (() => Array.from(document.querySelectorAll('img')) \
    .filter(img => !img.hasAttribute('alt') || img.getAttribute('alt').trim() === '') \
    .map(img => ({ html: img.outerHTML, src: img.getAttribute('src') || '' })))()";

/// Headings whose level jumps by more than one from the previous heading.
const HEADING_CHECK: &str = "\
  (() => { \
    const headings = Array.from(document.querySelectorAll('h1, h2, h3, h4, h5, h6')); \
    const offenders = []; \
    let previous = 0; \
    for (const heading of headings) { \
      const level = parseInt(heading.tagName.charAt(1), 10); \
      if (previous > 0 && level - previous > 1) { \
        offenders.push({ html: heading.outerHTML, level, previousLevel: previous }); \
      } \
      previous = level; \
    } \
    return offenders; \
  })()";

/// Form fields with no label, aria-label, or aria-labelledby. Hidden
/// fields, button-like inputs, and aria-hidden elements are skipped.
const FIELD_CHECK: &str = "\
  (() => Array.from(document.querySelectorAll('input, select, textarea')) \
    .filter(field => { \
      const type = field.getAttribute('type'); \
      if (type === 'hidden' || type === 'button' || type === 'submit' || type === 'reset' || \
          field.getAttribute('aria-hidden') === 'true') { \
        return false; \
      } \
      const id = field.getAttribute('id'); \
      const hasLabel = id ? document.querySelector('label[for=\"' + id + '\"]') !== null : false; \
      return !hasLabel && !field.hasAttribute('aria-label') && !field.hasAttribute('aria-labelledby'); \
    }) \
    .map(field => ({ \
      html: field.outerHTML, \
      type: field.getAttribute('type') || field.tagName.toLowerCase(), \
      id: field.getAttribute('id') || '' \
    })))()";

#[derive(Debug, Deserialize)]
struct ImageOffender {
    html: String,
    src: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadingOffender {
    html: String,
    level: u32,
    previous_level: u32,
}

#[derive(Debug, Deserialize)]
struct FieldOffender {
    html: String,
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

/// Run the fixed checks against the live DOM.
///
/// Never fails: an internal error yields a minimal result whose single
/// violation records the evaluator's own failure, with every check
/// marked incomplete.
pub async fn evaluate(page: &ScanPage, url: &str) -> AuditResult {
    tracing::info!("running basic accessibility checks without the rule engine");
    match run_checks(page, url).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("basic accessibility checks failed: {}", e);
            error_result(url, &e)
        }
    }
}

async fn run_checks(page: &ScanPage, url: &str) -> Result<AuditResult, BrowserError> {
    let mut violations = Vec::new();

    let images: Vec<ImageOffender> = page.evaluate(IMAGE_CHECK).await?;
    if !images.is_empty() {
        violations.push(images_violation(images));
    }

    let headings: Vec<HeadingOffender> = page.evaluate(HEADING_CHECK).await?;
    if !headings.is_empty() {
        violations.push(headings_violation(headings));
    }

    let fields: Vec<FieldOffender> = page.evaluate(FIELD_CHECK).await?;
    if !fields.is_empty() {
        violations.push(fields_violation(fields));
    }

    #[allow(clippy::cast_possible_truncation)]
    let passed = BASIC_CHECK_COUNT - violations.len() as u32;
    Ok(AuditResult::new(url, violations, passed, 0))
}

fn images_violation(offenders: Vec<ImageOffender>) -> RuleViolation {
    RuleViolation {
        id: "images-without-alt".to_string(),
        impact: Some(Severity::Serious),
        description: "Images without alternative text".to_string(),
        help: "Add an alt attribute to every image".to_string(),
        help_url: "https://www.w3.org/WAI/tutorials/images/".to_string(),
        nodes: offenders
            .into_iter()
            .map(|img| ViolationNode {
                failure_summary: format!("Image without alternative text: {}", img.src),
                target: vec![img.src],
                html: img.html,
            })
            .collect(),
    }
}

fn headings_violation(offenders: Vec<HeadingOffender>) -> RuleViolation {
    RuleViolation {
        id: "heading-order".to_string(),
        impact: Some(Severity::Moderate),
        description: "Headings are not in a sensible order".to_string(),
        help: "Order headings hierarchically without skipping levels".to_string(),
        help_url: "https://www.w3.org/WAI/tutorials/page-structure/headings/".to_string(),
        nodes: offenders
            .into_iter()
            .map(|h| ViolationNode {
                failure_summary: format!(
                    "Level {} heading directly after a level {} heading",
                    h.level, h.previous_level
                ),
                target: vec![format!("h{}", h.level)],
                html: h.html,
            })
            .collect(),
    }
}

fn fields_violation(offenders: Vec<FieldOffender>) -> RuleViolation {
    RuleViolation {
        id: "form-field-without-label".to_string(),
        impact: Some(Severity::Critical),
        description: "Form fields without labels".to_string(),
        help: "Associate a label with every form field".to_string(),
        help_url: "https://www.w3.org/WAI/tutorials/forms/labels/".to_string(),
        nodes: offenders
            .into_iter()
            .map(|field| ViolationNode {
                failure_summary: format!("Form field of type {} without a label", field.kind),
                target: vec![field.id],
                html: field.html,
            })
            .collect(),
    }
}

/// Minimal result recording the evaluator's own failure.
fn error_result(url: &str, error: &BrowserError) -> AuditResult {
    let violation = RuleViolation {
        id: "basic-audit-error".to_string(),
        impact: Some(Severity::Serious),
        description: "Basic accessibility checks could not run".to_string(),
        help: "The page likely enforces very restrictive security settings".to_string(),
        help_url: String::new(),
        nodes: vec![ViolationNode {
            html: "<html>...</html>".to_string(),
            target: vec![url.to_string()],
            failure_summary: format!("Error: {error}"),
        }],
    };

    AuditResult::new(url, vec![violation], 0, BASIC_CHECK_COUNT)
}
