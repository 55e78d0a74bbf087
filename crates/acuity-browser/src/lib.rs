//! Browser session layer for auditing untrusted remote pages.
//!
//! Provides scan-scoped headless browser control: one [`BrowserEngine`]
//! per scan attempt, navigation with observed HTTP status, and in-page
//! script evaluation for the rule pipeline.

pub mod engine;
pub mod error;
pub mod page;

pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use page::ScanPage;
