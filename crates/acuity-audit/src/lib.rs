//! Acuity Audit - The multi-stage accessibility scan pipeline.
//!
//! This crate drives one scan attempt end to end: browser launch, page
//! navigation, lazy-content preparation, rule-engine injection with
//! fallback, rule evaluation, and guaranteed browser teardown.
//!
//! # Pipeline
//!
//! 1. Launch an isolated headless browser instance
//! 2. Navigate to the target URL and wait for the load to settle
//! 3. Auto-scroll so lazy-loaded content materializes
//! 4. Inject the third-party rule engine, trying several techniques
//! 5. Run the engine, or the built-in basic checks when the target's
//!    security policy blocks every injection technique
//! 6. Aggregate violations into an [`acuity_core::AuditResult`]
//! 7. Tear the browser down on every exit path
//!
//! # Example
//!
//! ```rust,ignore
//! use acuity_audit::ScanOrchestrator;
//! use acuity_core::{AppConfig, ScanRequest};
//!
//! let orchestrator = ScanOrchestrator::new(AppConfig::default())?;
//! let result = orchestrator.run_scan(&ScanRequest::new("https://example.com")).await?;
//! println!("{} issues", result.summary.total_issues_count);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod basic;
pub mod error;
pub mod injector;
pub mod orchestrator;
pub mod rules;
pub mod runner;
pub mod scroll;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use injector::{InjectionStrategy, RuleEngineInjector};
pub use orchestrator::ScanOrchestrator;
pub use runner::ScanRunner;
