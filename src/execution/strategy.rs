//! # Batch Strategies
//!
//! Two interchangeable ways to apply a batch inside one transactional context,
//! selected once per run from configuration.
//!
//! - **Grouped**: the whole batch is passed as a single `_batch` parameter to one
//!   unit of work, which is expected to iterate it internally (the "UNWIND batch"
//!   pattern). Returns the batch size on success.
//! - **RowWise**: each record becomes its own unit of work, executed sequentially
//!   within the same context, with the record's fields merged with batch-scoped
//!   context (`_batch`, `_count`). A cancellation check runs every
//!   `cancel_check_interval` records so a long batch can still be stopped promptly;
//!   the check counter resets per batch.

use crate::config::RunConfig;
use crate::execution::collector::RunCollector;
use crate::execution::errors::WorkError;
use crate::execution::signal::StopSignal;
use crate::execution::types::{
    InputRecord, TransactionalResource, UnitOfWork, BATCH_PARAM, COUNT_PARAM,
};
use crate::execution::unit_runner::run_unit;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a batch is turned into units of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStrategy {
    /// Whole batch as one unit of work.
    Grouped,
    /// One unit of work per record, accumulated in one transaction.
    RowWise,
}

impl BatchStrategy {
    pub fn from_config(config: &RunConfig) -> Self {
        if config.row_wise {
            BatchStrategy::RowWise
        } else {
            BatchStrategy::Grouped
        }
    }

    /// Apply `batch` inside `context`, returning records processed.
    ///
    /// An empty batch is legal: a no-op that still counts as one completed batch
    /// with zero records processed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn apply<R: TransactionalResource>(
        self,
        context: &mut R::Context,
        unit: &dyn UnitOfWork<R>,
        batch: &[InputRecord],
        admitted_before: u64,
        signal: &StopSignal,
        retries: u32,
        cancel_check_interval: usize,
        collector: &RunCollector,
    ) -> Result<u64, WorkError> {
        if batch.is_empty() {
            return Ok(0);
        }
        match self {
            BatchStrategy::Grouped => {
                let params = grouped_params(batch, admitted_before + batch.len() as u64);
                run_unit(context, unit, &params, retries, collector).await?;
                Ok(batch.len() as u64)
            }
            BatchStrategy::RowWise => {
                let batch_value = batch_as_value(batch);
                let mut processed: u64 = 0;
                let mut since_check: usize = 0;
                for record in batch {
                    since_check += 1;
                    if since_check >= cancel_check_interval {
                        since_check = 0;
                        if signal.is_set() {
                            debug!(
                                processed = processed,
                                batch_len = batch.len(),
                                "Cancellation observed inside row-wise batch"
                            );
                            break;
                        }
                    }
                    let params = row_params(
                        record,
                        batch_value.clone(),
                        admitted_before + processed + 1,
                    );
                    processed += run_unit(context, unit, &params, retries, collector).await?;
                }
                Ok(processed)
            }
        }
    }
}

/// Parameters for one grouped unit of work: the whole batch plus the running
/// admitted count.
fn grouped_params(batch: &[InputRecord], count: u64) -> InputRecord {
    let mut params = InputRecord::new();
    params.insert(BATCH_PARAM.to_string(), batch_as_value(batch));
    params.insert(COUNT_PARAM.to_string(), serde_json::json!(count));
    params
}

/// Parameters for one row-wise unit of work: the record's own fields merged with
/// the surrounding batch and the running count.
fn row_params(record: &InputRecord, batch_value: serde_json::Value, count: u64) -> InputRecord {
    let mut params = record.clone();
    params.insert(BATCH_PARAM.to_string(), batch_value);
    params.insert(COUNT_PARAM.to_string(), serde_json::json!(count));
    params
}

fn batch_as_value(batch: &[InputRecord]) -> serde_json::Value {
    serde_json::Value::Array(
        batch
            .iter()
            .map(|record| {
                serde_json::Value::Object(
                    record
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect(),
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: i64) -> InputRecord {
        [("i".to_string(), serde_json::json!(value))]
            .into_iter()
            .collect()
    }

    #[test]
    fn strategy_follows_row_wise_flag() {
        let grouped = RunConfig::default();
        let row_wise = RunConfig {
            row_wise: true,
            ..RunConfig::default()
        };
        assert_eq!(BatchStrategy::from_config(&grouped), BatchStrategy::Grouped);
        assert_eq!(
            BatchStrategy::from_config(&row_wise),
            BatchStrategy::RowWise
        );
    }

    #[test]
    fn grouped_params_carry_batch_and_count() {
        let batch = vec![record(1), record(2)];
        let params = grouped_params(&batch, 42);
        assert_eq!(params[BATCH_PARAM].as_array().unwrap().len(), 2);
        assert_eq!(params[COUNT_PARAM], 42);
    }

    #[test]
    fn row_params_keep_record_field_order() {
        let mut record = InputRecord::new();
        record.insert("b".to_string(), serde_json::json!(1));
        record.insert("a".to_string(), serde_json::json!(2));
        let params = row_params(&record, serde_json::json!([]), 7);

        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", BATCH_PARAM, COUNT_PARAM]);
        assert_eq!(params[COUNT_PARAM], 7);
    }
}
