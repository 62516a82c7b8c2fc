//! Work-level errors and root-cause extraction.

/// Errors that can occur while applying a unit of work to the transactional resource.
#[derive(Debug, thiserror::Error)]
pub enum WorkError {
    /// The caller's unit-of-work function failed.
    #[error("Unit of work failed: {0}")]
    Unit(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Opening or committing a transactional context failed.
    #[error("Transaction error: {0}")]
    Transaction(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A batch task died before producing an outcome.
    #[error("Batch task panicked: {0}")]
    Panicked(String),
}

impl WorkError {
    /// Wrap an arbitrary caller error as a unit-of-work failure, preserving it as
    /// the source so root-cause extraction can reach the innermost message.
    pub fn unit(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        WorkError::Unit(error.into())
    }

    /// Wrap a transactional-resource error.
    pub fn transaction(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        WorkError::Transaction(error.into())
    }

    /// Build a unit-of-work failure from a bare message.
    pub fn message(message: impl Into<String>) -> Self {
        WorkError::Unit(message.into().into())
    }
}

/// Walk the `source()` chain to the innermost error and return its display text.
///
/// Error histogram buckets are keyed by this message so that structurally different
/// wrappers around the same ultimate cause collapse into one bucket.
pub fn root_cause_message(error: &(dyn std::error::Error + 'static)) -> String {
    let mut cause = error;
    while let Some(next) = cause.source() {
        cause = next;
    }
    cause.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("inner failure: {0}")]
    struct Inner(String);

    #[derive(Debug, thiserror::Error)]
    #[error("outer wrapper")]
    struct Outer(#[source] Inner);

    #[test]
    fn root_cause_unwraps_nested_sources() {
        let error = WorkError::unit(Outer(Inner("no space left".to_string())));
        assert_eq!(root_cause_message(&error), "inner failure: no space left");
    }

    #[test]
    fn root_cause_of_flat_error_is_its_own_message() {
        let error = WorkError::message("boom");
        assert_eq!(root_cause_message(&error), "boom");
    }

    #[test]
    fn different_wrappers_share_a_root_cause() {
        let a = WorkError::unit(Outer(Inner("disk full".to_string())));
        let b = WorkError::unit(Inner("disk full".to_string()));
        assert_eq!(root_cause_message(&a), root_cause_message(&b));
    }
}
