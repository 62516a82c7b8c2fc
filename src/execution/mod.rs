//! # Execution Engine
//!
//! Batched, bounded-concurrency execution over a transactional resource.
//!
//! ## Core Components
//!
//! - **BatchDriver**: pulls batches from the input in order, bounds in-flight batches,
//!   polls the stop signal, and drains everything into one aggregate snapshot
//! - **BatchStrategy**: grouped (whole batch as one unit of work) or row-wise (one unit
//!   of work per record inside one transactional context)
//! - **RunCollector**: thread-safe run-wide counters, error histogram, and failed-record
//!   sample, read once as a [`RunSnapshot`] when the run terminates
//! - **StopSignal**: polled cooperative cancellation flag shared with the enclosing layer
//! - **WorkerPools**: the two externally-owned runtime handles batch tasks are spawned on
//!
//! The transactional resource and the unit-of-work logic stay behind the
//! [`TransactionalResource`] and [`UnitOfWork`] traits; the engine never inspects what a
//! unit does, only whether it succeeded and how many records it reported.

pub mod collector;
pub mod driver;
pub mod errors;
pub mod signal;
pub mod strategy;
pub mod types;
pub mod worker_pools;

pub(crate) mod unit_runner;

pub use collector::{RunCollector, RunSnapshot};
pub use driver::BatchDriver;
pub use errors::{root_cause_message, WorkError};
pub use signal::StopSignal;
pub use strategy::BatchStrategy;
pub use types::{Batch, InputRecord, TransactionalResource, UnitOfWork, BATCH_PARAM, COUNT_PARAM};
pub use worker_pools::WorkerPools;
