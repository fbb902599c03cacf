//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A read or write against the backing store failed.
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// No link record exists at the given (scope, path).
    #[display("link not found: ({_0}, {})", _1.display())]
    NotFound(#[error(not(source))] String, PathBuf),
    /// A stored value could not be converted to or from its model type.
    #[display("invalid link data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // SQLITE_BUSY under a long write is the only transient failure.
        matches!(self, Self::Database)
    }
}
