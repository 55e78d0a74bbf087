//! Acuity Core - Foundation crate for the Acuity accessibility audit engine.
//!
//! This crate provides the shared data model, error handling, and
//! configuration management that all other Acuity crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - The audit data model (`ScanRequest`, `RuleViolation`,
//!   `AuditSummary`, `AuditResult`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use acuity_core::{AppConfig, AuditSummary};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.scanning.max_concurrent, 2);
//!
//! let summary = AuditSummary::from_violations("https://example.com", &[], 0, 0);
//! assert_eq!(summary.total_issues_count, 0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, RuleEngineConfig, ScanningConfig, ScrollConfig, ServiceConfig,
    DEFAULT_USER_AGENT,
};
pub use error::{AcuityError, ConfigError, ConfigResult, Result};
pub use types::{
    AuditResult, AuditSummary, RuleViolation, ScanRequest, Severity, Timestamp, ViolationNode,
};
