//! Error types for the journey engine.
//!
//! - [`JourneyError`] — Errors from parsing, publishing, executing and navigating journeys.
//! - [`ErrorContext`] — Structured error metadata (code, retryability, severity).
//!
//! Persistence errors live next to their traits ([`StoreError`](crate::store::StoreError),
//! [`CatalogError`](crate::catalog::CatalogError)) and are wrapped unmodified.

pub mod error_context;
pub mod journey_error;

pub use error_context::{ErrorCode, ErrorContext, ErrorRetryability, ErrorSeverity};
pub use journey_error::JourneyError;

/// Convenience alias for engine results.
pub type JourneyResult<T> = Result<T, JourneyError>;
