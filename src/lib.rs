#![allow(clippy::doc_markdown)] // Allow technical terms like UNWIND, IndexMap in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Bulkrun Core Rust
//!
//! High-performance Rust implementation of a batched, bounded-concurrency execution engine.
//!
//! ## Overview
//!
//! Bulkrun Core drives a (possibly very large, possibly lazily-produced) sequence of input
//! records against a shared transactional resource: it partitions the sequence into batches,
//! executes each batch as a unit of work, bounds how many batches run concurrently, retries
//! failed units a bounded number of times, supports cooperative mid-flight cancellation, and
//! produces an aggregated result that stays meaningful even when some batches fail.
//!
//! ## Architecture
//!
//! The engine is a **library component**: the concrete transactional resource, the unit-of-work
//! logic, the cancellation signal, and the worker pools are all external collaborators supplied
//! by the caller. The engine coordinates admission, concurrency, retries, and aggregation.
//!
//! ## Key Features
//!
//! - **Bounded concurrency**: admission control without a blocking semaphore, so the driver
//!   stays responsive to cancellation while capacity is saturated
//! - **Two batch strategies**: grouped (whole batch as one unit of work) and row-wise (one
//!   unit of work per record, accumulated in one transaction)
//! - **Partial-failure isolation**: a failed batch is recorded, never aborts the run
//! - **Bounded retry**: failed units are re-submitted up to a configured bound, with retry
//!   counts observable in the final snapshot
//! - **Named background jobs**: a registry where resubmitting a name cancels the prior job
//!
//! ## Module Organization
//!
//! - [`execution`] - Batch driver, strategies, retry runner, result collector
//! - [`registry`] - Named background job registry with cancel-on-resubmit
//! - [`config`] - Run configuration with environment overrides
//! - [`error`] - Structured error handling
//! - [`logging`] - Environment-aware structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulkrun_core::config::RunConfig;
//! use bulkrun_core::execution::{BatchDriver, StopSignal, WorkerPools};
//! use std::sync::Arc;
//!
//! # use bulkrun_core::execution::{InputRecord, TransactionalResource, UnitOfWork, WorkError};
//! # struct MyResource;
//! # #[async_trait::async_trait]
//! # impl TransactionalResource for MyResource {
//! #     type Context = ();
//! #     async fn begin(&self) -> Result<(), WorkError> { Ok(()) }
//! #     async fn commit(&self, _context: ()) -> Result<(), WorkError> { Ok(()) }
//! # }
//! # struct MyUnit;
//! # #[async_trait::async_trait]
//! # impl UnitOfWork<MyResource> for MyUnit {
//! #     async fn execute(&self, _context: &mut (), _params: &InputRecord) -> Result<u64, WorkError> { Ok(1) }
//! # }
//! # async fn example(records: Vec<InputRecord>) -> Result<(), Box<dyn std::error::Error>> {
//! let driver = BatchDriver::new(Arc::new(MyResource), WorkerPools::current(), RunConfig::default());
//! let snapshot = driver
//!     .run(records.into_iter(), Arc::new(MyUnit), StopSignal::new())
//!     .await?;
//! println!("committed {} of {} records", snapshot.committed, snapshot.total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod registry;

pub use config::RunConfig;
pub use error::{BulkrunError, Result};
pub use execution::{
    BatchDriver, BatchStrategy, InputRecord, RunCollector, RunSnapshot, StopSignal,
    TransactionalResource, UnitOfWork, WorkError, WorkerPools,
};
pub use registry::{JobRecord, JobRegistry};
