use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Timeout after {0}ms")]
    NetworkTimeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The store answered but refused the operation.
    #[error("Rejected by store: {0}")]
    Rejected(String),

    #[error("{} of {} items failed", .failed, .succeeded + .failed)]
    PartialBulkFailure { succeeded: usize, failed: usize },

    #[error("{operation}: {requested} items requested, limit is {limit}")]
    ValidationLimitExceeded {
        operation: String,
        requested: usize,
        limit: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl ConsoleError {
    /// Whether another attempt of the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsoleError::NetworkTimeout(_) | ConsoleError::Network(_) => true,
            ConsoleError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        ConsoleError::Serialization(e.to_string())
    }
}
