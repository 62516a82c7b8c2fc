use crate::error::{BulkrunError, Result};
use std::time::Duration;

/// Configuration for a single batched run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Records per batch.
    pub batch_size: usize,
    /// Maximum number of in-flight batches when running in parallel.
    pub concurrency: usize,
    /// Submit batches to the parallel pool; `false` routes everything through the
    /// single-thread pool with an admission bound of 1, preserving execution order.
    pub parallel: bool,
    /// Extra attempts per failed unit of work (0 = fail on first error).
    pub retries: u32,
    /// Maximum number of failed records sampled into the snapshot (0 = sampling off).
    pub failed_params_cap: usize,
    /// Apply each record as its own unit of work instead of the whole batch as one.
    pub row_wise: bool,
    /// Pause between admission re-checks while all slots are busy. Shorter values
    /// observe cancellation faster at the cost of more wake-ups; this is a pause,
    /// not a blocking wait, so the driver keeps polling the stop signal.
    pub admission_pause: Duration,
    /// How many records a row-wise batch processes between cancellation checks.
    /// The counter resets per batch.
    pub cancel_check_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            concurrency: 10,
            parallel: true,
            retries: 0,
            failed_params_cap: 0,
            row_wise: false,
            admission_pause: Duration::from_micros(100),
            cancel_check_interval: 1000,
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(batch_size) = std::env::var("BULKRUN_BATCH_SIZE") {
            config.batch_size = batch_size.parse().map_err(|e| {
                BulkrunError::ConfigurationError(format!("Invalid batch_size: {e}"))
            })?;
        }

        if let Ok(concurrency) = std::env::var("BULKRUN_CONCURRENCY") {
            config.concurrency = concurrency.parse().map_err(|e| {
                BulkrunError::ConfigurationError(format!("Invalid concurrency: {e}"))
            })?;
        }

        if let Ok(retries) = std::env::var("BULKRUN_RETRIES") {
            config.retries = retries
                .parse()
                .map_err(|e| BulkrunError::ConfigurationError(format!("Invalid retries: {e}")))?;
        }

        if let Ok(pause_us) = std::env::var("BULKRUN_ADMISSION_PAUSE_US") {
            let micros: u64 = pause_us.parse().map_err(|e| {
                BulkrunError::ConfigurationError(format!("Invalid admission_pause_us: {e}"))
            })?;
            config.admission_pause = Duration::from_micros(micros);
        }

        Ok(config)
    }

    /// Create configuration optimized for testing with small batches and short pauses
    pub fn for_testing() -> Self {
        Self {
            batch_size: 10,
            concurrency: 2,
            parallel: true,
            retries: 0,
            failed_params_cap: 100,
            row_wise: false,
            admission_pause: Duration::from_micros(50),
            cancel_check_interval: 1000,
        }
    }

    /// Reject configurations that cannot admit any work. Surfaced synchronously at
    /// submission time, before any batch is pulled from the input.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BulkrunError::ConfigurationError(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(BulkrunError::ConfigurationError(
                "concurrency must be greater than zero".to_string(),
            ));
        }
        if self.cancel_check_interval == 0 {
            return Err(BulkrunError::ConfigurationError(
                "cancel_check_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
