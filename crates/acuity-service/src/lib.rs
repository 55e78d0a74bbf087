//! Acuity Service - The outward-facing audit endpoint layer.
//!
//! This crate is what a rendering or transport layer calls into. It
//! validates incoming requests, pre-checks that the target URL is
//! reachable before a browser is ever launched, submits to the bounded
//! job queue with a fixed retry policy, and shapes the final response,
//! including the generic, non-leaking error message shown to end users.
//!
//! # Example
//!
//! ```rust,ignore
//! use acuity_audit::ScanOrchestrator;
//! use acuity_core::AppConfig;
//! use acuity_queue::AuditQueue;
//! use acuity_service::{AuditRequest, AuditService};
//!
//! let config = AppConfig::load_with_env()?;
//! let orchestrator = ScanOrchestrator::new(config.clone())?;
//! let queue = AuditQueue::new(orchestrator, config.scanning.max_concurrent);
//! let service = AuditService::new(queue, &config)?;
//!
//! let response = service.handle(AuditRequest::for_url("example.com")).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod precheck;
pub mod request;
pub mod service;
pub mod sink;

pub use error::{ErrorBody, Result, ServiceError};
pub use request::AuditRequest;
pub use service::{AuditResponse, AuditService};
pub use sink::ResultSink;
