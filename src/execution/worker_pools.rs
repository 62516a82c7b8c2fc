//! Externally-owned worker pools batch tasks are spawned on.

use tokio::runtime::Handle;

/// The two runtime handles the engine dispatches batch tasks to: a bounded
/// "parallel" pool for concurrent admission and a "single" pool used when the
/// caller disables parallelism.
///
/// Both handles are constructed and owned by the caller; the engine never manages
/// their lifecycle.
#[derive(Debug, Clone)]
pub struct WorkerPools {
    parallel: Handle,
    single: Handle,
}

impl WorkerPools {
    pub fn new(parallel: Handle, single: Handle) -> Self {
        Self { parallel, single }
    }

    /// Use one handle for both roles.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            parallel: handle.clone(),
            single: handle,
        }
    }

    /// Use the ambient runtime for both roles. Panics outside a tokio runtime,
    /// like [`Handle::current`].
    pub fn current() -> Self {
        Self::from_handle(Handle::current())
    }

    pub(crate) fn select(&self, parallel: bool) -> &Handle {
        if parallel {
            &self.parallel
        } else {
            &self.single
        }
    }
}
