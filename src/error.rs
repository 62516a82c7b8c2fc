use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BulkrunError {
    ConfigurationError(String),
    ExecutionError(String),
    RegistryError(String),
}

impl fmt::Display for BulkrunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkrunError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            BulkrunError::ExecutionError(msg) => write!(f, "Execution error: {msg}"),
            BulkrunError::RegistryError(msg) => write!(f, "Registry error: {msg}"),
        }
    }
}

impl std::error::Error for BulkrunError {}

pub type Result<T> = std::result::Result<T, BulkrunError>;
