use serde::{Deserialize, Serialize};

/// Error retryability marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorRetryability {
    Retryable,
    NonRetryable,
}

/// Error severity marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// Local to one run; the learner can be routed elsewhere.
    Warning,
    Error,
}

/// Error classification code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Authoring
    GraphParse,
    Config,
    ValidationFailed,
    VersionLifecycle,
    ContentNotFound,

    // Execution
    BlockNotFound,
    RunNotFound,
    VersionMismatch,
    RunNotActive,
    BlockNotCurrent,
    RoutingError,
    InvalidOutput,

    // Persistence
    StoreConflict,
    StoreUnavailable,
    StoreError,
}

/// Structured error context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub retryability: ErrorRetryability,
    pub severity: ErrorSeverity,
    pub message: String,
}

impl ErrorContext {
    pub fn non_retryable(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            retryability: ErrorRetryability::NonRetryable,
            severity: ErrorSeverity::Error,
            message: message.into(),
        }
    }

    pub fn retryable(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            retryability: ErrorRetryability::Retryable,
            severity: ErrorSeverity::Error,
            message: message.into(),
        }
    }

    /// Downgrade to a warning: the run is halted but no state was corrupted.
    pub fn recoverable(mut self) -> Self {
        self.severity = ErrorSeverity::Warning;
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryability == ErrorRetryability::Retryable
    }
}
