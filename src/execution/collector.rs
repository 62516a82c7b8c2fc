//! # Run Collector
//!
//! Thread-safe aggregation of run-wide statistics, reachable from every worker task
//! and read once as a [`RunSnapshot`] when the run terminates.
//!
//! No operation here blocks, fails, or panics: the collector must never be the cause
//! of a run failing. Counters are atomics; the error histogram and the failed-record
//! sample sit behind short non-async mutex sections.

use crate::execution::types::InputRecord;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Maximum number of distinct error-message buckets kept per run. Further distinct
/// messages collapse into [`ERROR_OVERFLOW_BUCKET`], keeping the histogram a
/// bounded-cardinality tally rather than a full log.
pub const ERROR_HISTOGRAM_CAP: usize = 1000;

/// Bucket that absorbs error messages past [`ERROR_HISTOGRAM_CAP`].
pub const ERROR_OVERFLOW_BUCKET: &str = "(other errors)";

/// Aggregate result of one batched run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Unique identifier for the run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the snapshot was taken
    pub finished_at: DateTime<Utc>,
    /// Records admitted into batches (counted at batch creation, so this includes
    /// in-flight work)
    pub total: u64,
    /// Records that completed successfully
    pub committed: u64,
    /// Records whose owning unit of work failed after exhausting retries
    pub failed_ops: u64,
    /// Batches that completed processing, successfully or not
    pub batches: u64,
    /// Batches whose owning task failed or died
    pub failed_batches: u64,
    /// Retry attempts performed across all units
    pub retries: u64,
    /// Occurrence count per normalized root-cause message
    pub error_messages: HashMap<String, u64>,
    /// Capped sample of records from failed batches, for diagnostics
    pub failed_params: Vec<InputRecord>,
    /// Whether the run was cancelled before draining the input
    pub was_terminated: bool,
}

/// Thread-safe collector of run-wide statistics and errors.
#[derive(Debug)]
pub struct RunCollector {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    total: AtomicU64,
    committed: AtomicU64,
    failed_ops: AtomicU64,
    batches: AtomicU64,
    failed_batches: AtomicU64,
    retries: AtomicU64,
    error_messages: Mutex<HashMap<String, u64>>,
    failed_params: Mutex<Vec<InputRecord>>,
    failed_params_cap: usize,
}

impl RunCollector {
    pub fn new(failed_params_cap: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            total: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            failed_ops: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            failed_batches: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            error_messages: Mutex::new(HashMap::new()),
            failed_params: Mutex::new(Vec::new()),
            failed_params_cap,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Count records admitted into a batch.
    pub fn increment_count(&self, records: u64) {
        self.total.fetch_add(records, Ordering::Relaxed);
    }

    /// Count one batch that finished processing (successfully or not).
    pub fn increment_batches(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Count records that completed successfully.
    pub fn increment_successes(&self, records: u64) {
        self.committed.fetch_add(records, Ordering::Relaxed);
    }

    /// Count records whose owning unit of work failed after exhausting retries.
    pub fn increment_failed_ops(&self, records: u64) {
        self.failed_ops.fetch_add(records, Ordering::Relaxed);
    }

    /// Count one batch whose owning task failed or died.
    pub fn increment_failed_batches(&self) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one extra attempt of a failed unit.
    pub fn increment_retried(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Bump the histogram bucket for a normalized error message, creating it if
    /// absent. Past [`ERROR_HISTOGRAM_CAP`] distinct messages, new messages land in
    /// the overflow bucket.
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        let mut buckets = self.error_messages.lock();
        if buckets.contains_key(&message) || buckets.len() < ERROR_HISTOGRAM_CAP {
            *buckets.entry(message).or_insert(0) += 1;
        } else {
            *buckets.entry(ERROR_OVERFLOW_BUCKET.to_string()).or_insert(0) += 1;
        }
    }

    /// Append records from a failed batch to the diagnostic sample, up to the
    /// configured cap. Records past the cap are dropped silently.
    pub fn amend_failed_params(&self, batch: &[InputRecord]) {
        if self.failed_params_cap == 0 {
            return;
        }
        let mut sample = self.failed_params.lock();
        for record in batch {
            if sample.len() >= self.failed_params_cap {
                break;
            }
            sample.push(record.clone());
        }
    }

    /// Copy out the current state. Read once when the run reaches its terminal state.
    pub fn snapshot(&self, was_terminated: bool) -> RunSnapshot {
        RunSnapshot {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            total: self.total.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            failed_ops: self.failed_ops.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            error_messages: self.error_messages.lock().clone(),
            failed_params: self.failed_params.lock().clone(),
            was_terminated,
        }
    }
}
