//! # Registry Infrastructure
//!
//! Named background job management.
//!
//! ## Overview
//!
//! The registry module holds the engine's named-job surface: a caller-owned
//! [`JobRegistry`] where submitting a job under an already-used name cancels the
//! still-running previous job and replaces its record. There is no ambient or
//! static registry: whichever component constructs the engine owns the instance
//! and passes it by handle.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bulkrun_core::registry::JobRegistry;
//! use tokio::runtime::Handle;
//!
//! # async fn example() {
//! let registry = JobRegistry::new(Handle::current());
//!
//! let first = registry.submit("nightly-sync", async { /* long-running work */ });
//! // Resubmitting the same name cancels the prior job, best-effort and without waiting
//! let second = registry.submit("nightly-sync", async { /* replacement work */ });
//! assert_eq!(registry.len(), 1);
//! # let _ = (first, second);
//! # }
//! ```

pub mod job_registry;

pub use job_registry::{JobRecord, JobRegistry};
