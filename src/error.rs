use std::fmt;

/// Coarse crate-level error used at the process boundary. The orchestration
/// layer carries the richer [`crate::orchestration::OrchestrationError`];
/// this type exists for callers that only need a broad classification.
#[derive(Debug, Clone, PartialEq)]
pub enum AtseError {
    OrchestrationError(String),
    TransactionError(String),
    ConfigurationError(String),
}

impl fmt::Display for AtseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtseError::OrchestrationError(msg) => write!(f, "Orchestration error: {msg}"),
            AtseError::TransactionError(msg) => write!(f, "Transaction error: {msg}"),
            AtseError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for AtseError {}

impl From<crate::orchestration::OrchestrationError> for AtseError {
    fn from(err: crate::orchestration::OrchestrationError) -> Self {
        match err {
            crate::orchestration::OrchestrationError::Configuration { message } => {
                AtseError::ConfigurationError(message)
            }
            other => AtseError::OrchestrationError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AtseError>;
