//! Retrying wrapper around a single unit-of-work invocation.

use crate::execution::collector::RunCollector;
use crate::execution::errors::WorkError;
use crate::execution::types::{InputRecord, TransactionalResource, UnitOfWork};
use tracing::warn;

/// Run one unit of work, re-submitting it up to `retries` extra attempts.
///
/// Each extra attempt is counted on the collector. Once the budget is exhausted the
/// failure propagates to the owning batch task, which records it exactly once.
pub(crate) async fn run_unit<R: TransactionalResource>(
    context: &mut R::Context,
    unit: &dyn UnitOfWork<R>,
    params: &InputRecord,
    retries: u32,
    collector: &RunCollector,
) -> Result<u64, WorkError> {
    let mut attempt: u32 = 0;
    loop {
        match unit.execute(context, params).await {
            Ok(count) => return Ok(count),
            Err(error) if attempt < retries => {
                attempt += 1;
                collector.increment_retried();
                warn!(
                    attempt = attempt,
                    max_attempts = retries,
                    error = %error,
                    "Unit of work failed, retrying"
                );
            }
            Err(error) => return Err(error),
        }
    }
}
