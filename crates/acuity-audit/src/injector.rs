//! Rule-engine injection with independent fallback techniques.
//!
//! Untrusted pages frequently carry content-security policies that block
//! one or another form of dynamic code loading. The injector therefore
//! tries an ordered list of techniques and probes the page's global scope
//! after each; total failure is not an error but a signal to fall back to
//! the basic rule evaluator.

use crate::error::{Result, ScanError};
use crate::rules::ENGINE_READY_PROBE;
use acuity_browser::ScanPage;
use acuity_core::config::RuleEngineConfig;
use std::time::Duration;

/// One technique for getting the engine bundle executing in page context.
///
/// Techniques are fully independent: a failure of one says nothing about
/// the next, so each is attempted regardless of earlier outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionStrategy {
    /// Append a `<script>` element carrying the bundle as text content
    ScriptElement,
    /// Evaluate the bundle text directly in the page's script context
    DirectEval,
    /// Construct and invoke a dynamic function built from the bundle text
    DynamicFunction,
}

impl InjectionStrategy {
    /// All techniques in their fixed attempt order.
    pub const ALL: [Self; 3] = [Self::ScriptElement, Self::DirectEval, Self::DynamicFunction];

    /// Short name for log lines.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ScriptElement => "script-element",
            Self::DirectEval => "direct-eval",
            Self::DynamicFunction => "dynamic-function",
        }
    }

    /// Build the page-side expression applying this technique to `bundle`.
    #[must_use]
    pub fn expression(self, bundle: &str) -> String {
        let source = js_string_literal(bundle);
        match self {
            Self::ScriptElement => format!(
                "(() => {{ \
                   const s = document.createElement('script'); \
                   s.textContent = {source}; \
                   document.head.appendChild(s); \
                   return true; \
                 }})()"
            ),
            Self::DirectEval => format!("(() => {{ window.eval({source}); return true; }})()"),
            Self::DynamicFunction => {
                format!("(() => {{ new Function({source})(); return true; }})()")
            }
        }
    }
}

/// Encode arbitrary script text as a JavaScript string literal.
fn js_string_literal(text: &str) -> String {
    // Serializing a string cannot fail; the fallback is never reached.
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// Fetches the rule engine bundle and injects it into scan pages.
pub struct RuleEngineInjector {
    client: reqwest::Client,
    bundle_url: String,
}

impl RuleEngineInjector {
    /// Create an injector for the configured bundle source.
    pub fn new(config: &RuleEngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| ScanError::BundleFetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            bundle_url: config.bundle_url.clone(),
        })
    }

    /// Fetch the engine bundle from its CDN.
    ///
    /// Fetched per scan; the URL pins the engine version, and skipping a
    /// cache keeps the engine from going stale between deployments.
    pub async fn fetch_bundle(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.bundle_url)
            .send()
            .await
            .map_err(|e| ScanError::BundleFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScanError::BundleFetch(format!(
                "{} answered HTTP {}",
                self.bundle_url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ScanError::BundleFetch(e.to_string()))
    }

    /// Try to make the rule engine available in the page's global scope.
    ///
    /// Returns `true` once any technique leaves the engine's entry point
    /// reachable, `false` when every technique failed (typically a strict
    /// content-security policy). A bundle fetch failure is a real error.
    pub async fn inject(&self, page: &ScanPage) -> Result<bool> {
        let bundle = self.fetch_bundle().await?;

        for strategy in InjectionStrategy::ALL {
            if let Err(e) = page.execute(strategy.expression(&bundle)).await {
                tracing::debug!("injection technique {} errored: {}", strategy.name(), e);
            }

            match page.evaluate::<bool>(ENGINE_READY_PROBE).await {
                Ok(true) => {
                    tracing::info!("rule engine injected via {}", strategy.name());
                    return Ok(true);
                }
                Ok(false) => {
                    tracing::debug!("engine not present after {}", strategy.name());
                }
                Err(e) => {
                    tracing::debug!("engine probe failed after {}: {}", strategy.name(), e);
                }
            }
        }

        tracing::warn!("all injection techniques failed; page likely blocks dynamic code");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_order_is_fixed() {
        assert_eq!(
            InjectionStrategy::ALL,
            [
                InjectionStrategy::ScriptElement,
                InjectionStrategy::DirectEval,
                InjectionStrategy::DynamicFunction,
            ]
        );
    }

    #[test]
    fn test_expressions_embed_escaped_bundle() {
        let bundle = "var axe = {};\n// \"quoted\" comment";
        for strategy in InjectionStrategy::ALL {
            let expr = strategy.expression(bundle);
            // The bundle must appear as a proper JS string literal
            assert!(expr.contains("\\\"quoted\\\""), "{}", strategy.name());
            assert!(expr.contains("\\n"), "{}", strategy.name());
        }
    }

    #[test]
    fn test_each_strategy_uses_its_technique() {
        let bundle = "x";
        assert!(InjectionStrategy::ScriptElement
            .expression(bundle)
            .contains("createElement('script')"));
        assert!(InjectionStrategy::DirectEval
            .expression(bundle)
            .contains("window.eval"));
        assert!(InjectionStrategy::DynamicFunction
            .expression(bundle)
            .contains("new Function"));
    }

    #[test]
    fn test_js_string_literal_round_trips() {
        let text = "line1\nline2\t\"quotes\" and \\backslash";
        let literal = js_string_literal(text);
        let decoded: String = serde_json::from_str(&literal).expect("valid literal");
        assert_eq!(decoded, text);
    }
}
