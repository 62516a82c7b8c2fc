#![allow(dead_code)]

//! Shared mock collaborators for engine integration tests.

use async_trait::async_trait;
use bulkrun_core::execution::{
    InputRecord, StopSignal, TransactionalResource, UnitOfWork, WorkError, BATCH_PARAM,
};
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory transactional resource that counts opened and committed contexts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub begun: AtomicU64,
    pub committed: AtomicU64,
}

pub struct MemoryTransaction;

#[async_trait]
impl TransactionalResource for MemoryStore {
    type Context = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, WorkError> {
        self.begun.fetch_add(1, Ordering::Relaxed);
        Ok(MemoryTransaction)
    }

    async fn commit(&self, _context: MemoryTransaction) -> Result<(), WorkError> {
        self.committed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Build `n` records shaped `{"i": 0..n}`.
pub fn records(n: usize) -> Vec<InputRecord> {
    (0..n)
        .map(|i| {
            [("i".to_string(), serde_json::json!(i))]
                .into_iter()
                .collect()
        })
        .collect()
}

/// Read the `"i"` field of a row-wise parameter map.
pub fn row_index(params: &InputRecord) -> i64 {
    params["i"].as_i64().unwrap_or(-1)
}

/// Succeeds always, reporting one record per row-wise invocation and the batch
/// length per grouped invocation.
pub struct CountingUnit;

#[async_trait]
impl UnitOfWork<MemoryStore> for CountingUnit {
    async fn execute(
        &self,
        _context: &mut MemoryTransaction,
        params: &InputRecord,
    ) -> Result<u64, WorkError> {
        match params.get(BATCH_PARAM) {
            // Grouped invocations carry only the batch and the running count
            Some(batch) if params.len() == 2 => {
                Ok(batch.as_array().map(|rows| rows.len() as u64).unwrap_or(0))
            }
            _ => Ok(1),
        }
    }
}

/// Fails every invocation with a fixed message.
pub struct AlwaysFailUnit {
    pub message: &'static str,
}

#[async_trait]
impl UnitOfWork<MemoryStore> for AlwaysFailUnit {
    async fn execute(
        &self,
        _context: &mut MemoryTransaction,
        _params: &InputRecord,
    ) -> Result<u64, WorkError> {
        Err(WorkError::message(self.message))
    }
}

/// Fails the first `failures_before_success` invocations, then succeeds.
pub struct EventuallySucceedsUnit {
    pub failures_before_success: u64,
    pub attempts: AtomicU64,
}

impl EventuallySucceedsUnit {
    pub fn new(failures_before_success: u64) -> Self {
        Self {
            failures_before_success,
            attempts: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl UnitOfWork<MemoryStore> for EventuallySucceedsUnit {
    async fn execute(
        &self,
        context: &mut MemoryTransaction,
        params: &InputRecord,
    ) -> Result<u64, WorkError> {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed);
        if attempt < self.failures_before_success {
            Err(WorkError::message("transient failure"))
        } else {
            CountingUnit.execute(context, params).await
        }
    }
}

/// Row-wise unit that fails every record whose `"i"` is congruent to 2 mod 3.
pub struct FailEveryThirdUnit;

#[async_trait]
impl UnitOfWork<MemoryStore> for FailEveryThirdUnit {
    async fn execute(
        &self,
        _context: &mut MemoryTransaction,
        params: &InputRecord,
    ) -> Result<u64, WorkError> {
        if row_index(params) % 3 == 2 {
            Err(WorkError::message("synthetic record failure"))
        } else {
            Ok(1)
        }
    }
}

/// Grouped unit that fails any batch containing a record with `"poison": true`.
pub struct PoisonBatchUnit;

#[async_trait]
impl UnitOfWork<MemoryStore> for PoisonBatchUnit {
    async fn execute(
        &self,
        _context: &mut MemoryTransaction,
        params: &InputRecord,
    ) -> Result<u64, WorkError> {
        let rows = params[BATCH_PARAM].as_array().cloned().unwrap_or_default();
        if rows
            .iter()
            .any(|row| row["poison"].as_bool().unwrap_or(false))
        {
            Err(WorkError::message("poisoned batch"))
        } else {
            Ok(rows.len() as u64)
        }
    }
}

/// Succeeds on every record, setting the stop signal once `after` records have
/// been seen across all invocations.
pub struct SignalAfterUnit {
    pub after: u64,
    pub seen: AtomicU64,
    pub signal: StopSignal,
}

impl SignalAfterUnit {
    pub fn new(after: u64, signal: StopSignal) -> Self {
        Self {
            after,
            seen: AtomicU64::new(0),
            signal,
        }
    }
}

#[async_trait]
impl UnitOfWork<MemoryStore> for SignalAfterUnit {
    async fn execute(
        &self,
        _context: &mut MemoryTransaction,
        _params: &InputRecord,
    ) -> Result<u64, WorkError> {
        if self.seen.fetch_add(1, Ordering::Relaxed) + 1 == self.after {
            self.signal.set();
        }
        Ok(1)
    }
}
