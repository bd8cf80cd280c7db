//! Engine-level error types.

use crate::catalog::CatalogError;
use crate::domain::execution::RunStatus;
use crate::domain::model::VersionStatus;
use crate::dsl::validation::ValidationReport;
use crate::store::StoreError;
use thiserror::Error;

use super::error_context::{ErrorCode, ErrorContext};

/// Errors surfaced by the journey engine, catalogue and navigator.
#[derive(Debug, Error)]
pub enum JourneyError {
    #[error("Graph parse error: {0}")]
    GraphParse(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Validation failed")]
    ValidationFailed(Box<ValidationReport>),
    #[error("Duplicate block id: {0}")]
    DuplicateBlock(String),
    #[error("Block not found: {0}")]
    BlockNotFound(String),
    #[error("Run not found: {0}")]
    RunNotFound(String),
    #[error("Journey version not found: {0}")]
    VersionNotFound(String),
    #[error("Module not found: {0}")]
    ModuleNotFound(String),
    #[error("Track not found: {0}")]
    TrackNotFound(String),
    #[error("Module '{0}' has no published journey version")]
    NoPublishedVersion(String),
    #[error("Run '{run_id}' belongs to version '{run_version}', not '{graph_version}'")]
    VersionMismatch {
        run_id: String,
        run_version: String,
        graph_version: String,
    },
    #[error("Run '{run_id}' is {status}, not in progress")]
    RunNotActive { run_id: String, status: RunStatus },
    #[error("Block '{block_id}' is not the current block of run '{run_id}'")]
    BlockNotCurrent { run_id: String, block_id: String },
    #[error("Edge from '{from}' points at missing block '{to}'")]
    DanglingEdge { from: String, to: String },
    #[error("Start block '{0}' does not exist in the graph")]
    MissingStartBlock(String),
    #[error("Invalid output for block '{block_id}': {message}")]
    InvalidOutput { block_id: String, message: String },
    #[error("Journey version '{0}' is frozen")]
    VersionFrozen(String),
    #[error("Journey version '{version_id}' cannot go from {from} to {to}")]
    InvalidVersionTransition {
        version_id: String,
        from: VersionStatus,
        to: VersionStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl JourneyError {
    /// Classify the error for callers deciding whether to retry the learner action.
    pub fn error_context(&self) -> ErrorContext {
        let message = self.to_string();
        match self {
            JourneyError::GraphParse(_) => ErrorContext::non_retryable(ErrorCode::GraphParse, message),
            JourneyError::Config(_) => ErrorContext::non_retryable(ErrorCode::Config, message),
            JourneyError::ValidationFailed(_) | JourneyError::DuplicateBlock(_) => {
                ErrorContext::non_retryable(ErrorCode::ValidationFailed, message)
            }
            JourneyError::BlockNotFound(_) => {
                ErrorContext::non_retryable(ErrorCode::BlockNotFound, message)
            }
            JourneyError::RunNotFound(_) => ErrorContext::non_retryable(ErrorCode::RunNotFound, message),
            JourneyError::VersionNotFound(_)
            | JourneyError::ModuleNotFound(_)
            | JourneyError::TrackNotFound(_)
            | JourneyError::NoPublishedVersion(_) => {
                ErrorContext::non_retryable(ErrorCode::ContentNotFound, message)
            }
            JourneyError::VersionMismatch { .. } => {
                ErrorContext::non_retryable(ErrorCode::VersionMismatch, message)
            }
            JourneyError::RunNotActive { .. } => {
                ErrorContext::non_retryable(ErrorCode::RunNotActive, message)
            }
            JourneyError::BlockNotCurrent { .. } => {
                ErrorContext::non_retryable(ErrorCode::BlockNotCurrent, message)
            }
            JourneyError::DanglingEdge { .. } | JourneyError::MissingStartBlock(_) => {
                ErrorContext::non_retryable(ErrorCode::RoutingError, message).recoverable()
            }
            JourneyError::InvalidOutput { .. } => {
                ErrorContext::non_retryable(ErrorCode::InvalidOutput, message)
            }
            JourneyError::VersionFrozen(_) | JourneyError::InvalidVersionTransition { .. } => {
                ErrorContext::non_retryable(ErrorCode::VersionLifecycle, message)
            }
            JourneyError::Store(StoreError::Conflict { .. }) => {
                ErrorContext::retryable(ErrorCode::StoreConflict, message)
            }
            JourneyError::Store(StoreError::Storage(_)) => {
                ErrorContext::retryable(ErrorCode::StoreUnavailable, message)
            }
            JourneyError::Store(_) => ErrorContext::non_retryable(ErrorCode::StoreError, message),
            JourneyError::Catalog(CatalogError::Storage(_)) => {
                ErrorContext::retryable(ErrorCode::StoreUnavailable, message)
            }
            JourneyError::Catalog(_) => ErrorContext::non_retryable(ErrorCode::StoreError, message),
        }
    }
}
