//! Core types and collaborator seams for the execution engine.

use crate::execution::errors::WorkError;
use async_trait::async_trait;
use indexmap::IndexMap;

/// One input record: an ordered mapping of named values. Owned by the caller;
/// the engine groups records into batches but never mutates them.
pub type InputRecord = IndexMap<String, serde_json::Value>;

/// An ordered, finite slice of the input sequence, consumed by exactly one worker task.
pub type Batch = Vec<InputRecord>;

/// Parameter key under which the grouped strategy passes the whole batch, and the
/// row-wise strategy passes the surrounding batch.
pub const BATCH_PARAM: &str = "_batch";

/// Parameter key for the running count of admitted records.
pub const COUNT_PARAM: &str = "_count";

/// External transactional resource the engine applies units of work against.
///
/// Each worker task obtains a fresh context via [`begin`](Self::begin); a context is
/// never shared across tasks. On success the engine calls [`commit`](Self::commit);
/// on failure the context is dropped and no special action is taken. Any explicit
/// rollback needs belong to the caller's unit of work.
#[async_trait]
pub trait TransactionalResource: Send + Sync + 'static {
    /// Transactional context handed to units of work, one per worker task.
    type Context: Send + 'static;

    /// Open a fresh transactional context for one batch task.
    async fn begin(&self) -> Result<Self::Context, WorkError>;

    /// Commit a context after its batch succeeded.
    async fn commit(&self, context: Self::Context) -> Result<(), WorkError>;
}

/// Caller-supplied unit of work: an opaque operation from (context, params) to a
/// summable per-unit record count.
///
/// The engine treats the returned count as opaque statistics: it folds counts into
/// the run snapshot but never interprets them. Implementations are invoked from
/// worker tasks and must be shareable across them.
#[async_trait]
pub trait UnitOfWork<R: TransactionalResource>: Send + Sync + 'static {
    /// Apply this unit to `params` inside `context`. Errors are retried up to the
    /// configured bound before the owning batch is recorded as failed.
    async fn execute(
        &self,
        context: &mut R::Context,
        params: &InputRecord,
    ) -> Result<u64, WorkError>;
}
