//! Acuity Queue - Admission control for scan attempts.
//!
//! Browser instances are the scarce resource of the whole system, so
//! callers never reach the scan pipeline directly. They submit through
//! an [`AuditQueue`], which admits at most a fixed number of attempts at
//! once and services the backlog in strict arrival order.
//!
//! The queue is an owned component constructed once per service process
//! and shared by cloning, not hidden global state.
//!
//! # Example
//!
//! ```rust,ignore
//! use acuity_queue::AuditQueue;
//! use acuity_core::ScanRequest;
//!
//! let queue = AuditQueue::new(orchestrator, 2);
//! let result = queue.submit(ScanRequest::new("https://example.com")).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod queue;

pub use queue::AuditQueue;
