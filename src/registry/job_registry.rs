//! # Job Registry
//!
//! Named background job submission with cancel-on-resubmit semantics.
//!
//! ## Key Behaviors
//!
//! - **Replace-and-cancel-previous**: submitting under an existing name atomically
//!   swaps the map entry; if the displaced job has not finished, its future is
//!   aborted without waiting (best-effort, fire-and-forget)
//! - **Identity by name**: two [`JobRecord`]s are equal iff their names are equal,
//!   which is what makes the replacement semantics well-defined
//! - **No automatic eviction**: completed jobs stay in the registry until the
//!   caller removes them

use dashmap::DashMap;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// One named background job: the scheduled future plus its observed state.
///
/// `done` and `cancelled` are snapshots; call [`update`](Self::update) to recompute
/// them from the underlying task without blocking.
#[derive(Debug, Clone)]
pub struct JobRecord {
    name: String,
    handle: Arc<JoinHandle<()>>,
    cancel_requested: Arc<AtomicBool>,
    /// Whether the underlying task has finished (successfully, by panic, or by abort).
    pub done: bool,
    /// Whether cancellation was requested for this job.
    pub cancelled: bool,
}

impl JobRecord {
    fn new(name: String, handle: JoinHandle<()>) -> Self {
        Self {
            name,
            handle: Arc::new(handle),
            cancel_requested: Arc::new(AtomicBool::new(false)),
            done: false,
            cancelled: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recompute `done`/`cancelled` from the underlying task state. Never blocks.
    pub fn update(&mut self) {
        self.done = self.handle.is_finished();
        self.cancelled = self.cancel_requested.load(Ordering::Acquire);
    }

    /// Request cancellation of the scheduled future without waiting for it to stop.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
        self.handle.abort();
    }
}

impl PartialEq for JobRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for JobRecord {}

impl Hash for JobRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Caller-owned registry of named background jobs.
pub struct JobRegistry {
    scheduler: Handle,
    jobs: DashMap<String, JobRecord>,
}

impl JobRegistry {
    /// Create a registry that schedules jobs on the given runtime handle. The
    /// handle is an external collaborator; the registry never manages its
    /// lifecycle.
    pub fn new(scheduler: Handle) -> Self {
        Self {
            scheduler,
            jobs: DashMap::new(),
        }
    }

    /// Schedule `future` under `name`, cancelling any still-running job previously
    /// submitted under the same name. Returns the new job's record.
    pub fn submit<F>(&self, name: impl Into<String>, future: F) -> JobRecord
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = self.scheduler.spawn(future);
        let record = JobRecord::new(name.clone(), handle);

        // Atomic per-key swap: the displaced record is returned and cancelled
        // without waiting for it to stop.
        if let Some(mut previous) = self.jobs.insert(name.clone(), record.clone()) {
            previous.update();
            if !previous.done {
                info!(job = %name, "Cancelling still-running job on resubmit");
                previous.cancel();
            } else {
                debug!(job = %name, "Replacing finished job");
            }
        } else {
            debug!(job = %name, "Job submitted");
        }

        record
    }

    /// Current record for `name`, with freshly recomputed state.
    pub fn get(&self, name: &str) -> Option<JobRecord> {
        self.jobs.get(name).map(|entry| {
            let mut record = entry.value().clone();
            record.update();
            record
        })
    }

    /// Remove the record for `name`, cancelling the job if it is still running.
    pub fn remove(&self, name: &str) -> Option<JobRecord> {
        self.jobs.remove(name).map(|(_, mut record)| {
            record.update();
            if !record.done {
                record.cancel();
            }
            record
        })
    }

    /// Names of all registered jobs, finished or not.
    pub fn names(&self) -> Vec<String> {
        self.jobs.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
