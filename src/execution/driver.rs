//! # Batch Driver
//!
//! ## Architecture: Ordered Admission, Unordered Completion
//!
//! The BatchDriver is the engine's coordination loop. It pulls batches from the input
//! sequence in strict input order, bounds how many batches are in flight, polls the
//! stop signal, and drains everything into one aggregate [`RunSnapshot`].
//!
//! ## Key Responsibilities
//!
//! - **Admission control**: at most `concurrency` batches in flight (1 in sequential
//!   mode). When capacity is saturated the driver parks for `admission_pause` and
//!   re-checks instead of waiting on a semaphore; a blocking wait would leave the
//!   loop unable to observe cancellation until a slot frees up
//! - **Dispatch**: each batch runs as its own task on the caller-owned worker pools,
//!   with a fresh transactional context per task
//! - **Failure containment**: a batch that exhausts its retry budget is recorded in
//!   the collector and the loop keeps pulling further batches; only cancellation or
//!   input exhaustion stops admission
//! - **Draining**: all submitted tasks are awaited; successful outcomes contribute
//!   their counts, failed or died tasks contribute a failed batch and zero records
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bulkrun_core::config::RunConfig;
//! use bulkrun_core::execution::{BatchDriver, InputRecord, StopSignal, WorkerPools};
//! use std::sync::Arc;
//!
//! # use bulkrun_core::execution::{TransactionalResource, UnitOfWork, WorkError};
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
//! let signal = StopSignal::new();
//! let driver = BatchDriver::new(Arc::new(MyResource), WorkerPools::current(), RunConfig::default());
//! let snapshot = driver.run(records.into_iter(), Arc::new(MyUnit), signal).await?;
//! assert_eq!(snapshot.committed + snapshot.failed_ops, snapshot.total);
//! # Ok(())
//! # }
//! ```

use crate::config::RunConfig;
use crate::error::Result;
use crate::execution::collector::{RunCollector, RunSnapshot};
use crate::execution::errors::{root_cause_message, WorkError};
use crate::execution::signal::StopSignal;
use crate::execution::strategy::BatchStrategy;
use crate::execution::types::{InputRecord, TransactionalResource, UnitOfWork};
use crate::execution::worker_pools::WorkerPools;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Decrements the in-flight gauge when a batch task finishes, however it finishes.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Coordination loop for one batched run over a transactional resource.
pub struct BatchDriver<R: TransactionalResource> {
    resource: Arc<R>,
    pools: WorkerPools,
    config: RunConfig,
}

impl<R: TransactionalResource> BatchDriver<R> {
    pub fn new(resource: Arc<R>, pools: WorkerPools, config: RunConfig) -> Self {
        Self {
            resource,
            pools,
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Drive `records` to completion or early termination and return the aggregate
    /// snapshot.
    ///
    /// The input is consumed exactly once, in order. The driver runs on the caller's
    /// task and only dispatches work; its single suspension point is the short
    /// admission pause. Batch failures are folded into the snapshot; the only error
    /// this returns is a synchronous `ConfigurationError` for a config that cannot
    /// admit work.
    #[instrument(skip(self, records, unit, signal), fields(
        batch_size = self.config.batch_size,
        concurrency = self.config.concurrency,
        parallel = self.config.parallel
    ))]
    pub async fn run<I>(
        &self,
        records: I,
        unit: Arc<dyn UnitOfWork<R>>,
        signal: StopSignal,
    ) -> Result<RunSnapshot>
    where
        I: Iterator<Item = InputRecord> + Send,
    {
        self.config.validate()?;

        let strategy = BatchStrategy::from_config(&self.config);
        let collector = Arc::new(RunCollector::new(self.config.failed_params_cap));
        let run_id = collector.run_id();
        let max_in_flight = if self.config.parallel {
            self.config.concurrency
        } else {
            1
        };
        let pool = self.pools.select(self.config.parallel).clone();

        info!(
            run_id = %run_id,
            strategy = ?strategy,
            retries = self.config.retries,
            "Starting batched run"
        );

        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut records = records.peekable();
        let mut handles: Vec<JoinHandle<std::result::Result<u64, WorkError>>> = Vec::new();
        let mut admitted: u64 = 0;
        let mut batch_index: u64 = 0;
        let mut terminated = false;

        loop {
            if signal.is_set() {
                terminated = true;
                info!(
                    run_id = %run_id,
                    admitted_batches = batch_index,
                    "Cancellation observed, stopping admission"
                );
                break;
            }
            if records.peek().is_none() {
                break;
            }
            if in_flight.load(Ordering::Acquire) >= max_in_flight {
                tokio::time::sleep(self.config.admission_pause).await;
                continue;
            }

            let batch: Vec<InputRecord> = records.by_ref().take(self.config.batch_size).collect();
            let admitted_before = admitted;
            admitted += batch.len() as u64;
            collector.increment_count(batch.len() as u64);
            in_flight.fetch_add(1, Ordering::AcqRel);
            debug!(
                run_id = %run_id,
                batch_index = batch_index,
                records = batch.len(),
                "Batch admitted"
            );

            let handle = pool.spawn(Self::batch_task(
                self.resource.clone(),
                unit.clone(),
                strategy,
                batch,
                admitted_before,
                signal.clone(),
                self.config.retries,
                self.config.cancel_check_interval,
                collector.clone(),
                in_flight.clone(),
                batch_index,
            ));
            handles.push(handle);
            batch_index += 1;
        }

        // Drain: await every submitted task's outcome. Batch-level failures were
        // already recorded at the batch boundary; a task that died contributes a
        // failed batch and zero records.
        for outcome in join_all(handles).await {
            match outcome {
                Ok(Ok(count)) => collector.increment_successes(count),
                Ok(Err(_)) => {}
                Err(join_error) => {
                    collector.increment_failed_batches();
                    if join_error.is_panic() {
                        let message = format!("batch task panicked: {join_error}");
                        warn!(run_id = %run_id, error = %message, "Batch task died");
                        collector.record_error(message);
                    }
                }
            }
        }

        if signal.is_set() {
            terminated = true;
        }

        let snapshot = collector.snapshot(terminated);
        info!(
            run_id = %run_id,
            total = snapshot.total,
            committed = snapshot.committed,
            failed_ops = snapshot.failed_ops,
            batches = snapshot.batches,
            failed_batches = snapshot.failed_batches,
            retries = snapshot.retries,
            was_terminated = snapshot.was_terminated,
            "Batched run finished"
        );
        Ok(snapshot)
    }

    /// One batch's task: fresh context, strategy application, commit, bookkeeping.
    #[allow(clippy::too_many_arguments)]
    async fn batch_task(
        resource: Arc<R>,
        unit: Arc<dyn UnitOfWork<R>>,
        strategy: BatchStrategy,
        batch: Vec<InputRecord>,
        admitted_before: u64,
        signal: StopSignal,
        retries: u32,
        cancel_check_interval: usize,
        collector: Arc<RunCollector>,
        in_flight: Arc<AtomicUsize>,
        batch_index: u64,
    ) -> std::result::Result<u64, WorkError> {
        let _guard = InFlightGuard(in_flight);

        let result = Self::execute_batch(
            &resource,
            unit.as_ref(),
            strategy,
            &batch,
            admitted_before,
            &signal,
            retries,
            cancel_check_interval,
            &collector,
        )
        .await;

        collector.increment_batches();
        if let Err(error) = &result {
            collector.increment_failed_ops(batch.len() as u64);
            collector.amend_failed_params(&batch);
            collector.record_error(root_cause_message(error));
            collector.increment_failed_batches();
            warn!(
                batch_index = batch_index,
                records = batch.len(),
                error = %error,
                "Batch failed after exhausting retries"
            );
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_batch(
        resource: &R,
        unit: &dyn UnitOfWork<R>,
        strategy: BatchStrategy,
        batch: &[InputRecord],
        admitted_before: u64,
        signal: &StopSignal,
        retries: u32,
        cancel_check_interval: usize,
        collector: &RunCollector,
    ) -> std::result::Result<u64, WorkError> {
        let mut context = resource.begin().await?;
        let processed = strategy
            .apply(
                &mut context,
                unit,
                batch,
                admitted_before,
                signal,
                retries,
                cancel_check_interval,
                collector,
            )
            .await?;
        resource.commit(context).await?;
        Ok(processed)
    }
}
