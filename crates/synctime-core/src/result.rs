//! Convenience result type alias for SyncTime.

use crate::error::AppError;

/// A specialized `Result` type for SyncTime operations.
pub type AppResult<T> = Result<T, AppError>;
