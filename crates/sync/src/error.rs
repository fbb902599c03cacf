//! Sync Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Failures from the filesystem and the
//! link store are raised as [`ErrorKind::Filesystem`] and [`ErrorKind::Store`]
//! with the original error kept as the child frame.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A sync error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a sync failure.
///
/// ### Operational Errors
/// - [`ErrorKind::CountMismatch`]
/// - [`ErrorKind::MissingFileId`]
/// - [`ErrorKind::StaleRecord`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Filesystem`] - includes listing a path that is not a
///   directory and any I/O failure during traversal.
/// - [`ErrorKind::Store`]
/// - [`ErrorKind::Config`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A filesystem operation (list, read, token replacement) failed.
    #[display("filesystem operation failed")]
    Filesystem,
    /// A link store lookup or write failed.
    #[display("link store operation failed")]
    Store,
    /// The old and new directory listings of a copy or move do not contain
    /// the same number of files, so they cannot be paired up.
    #[display("file count doesn't match between old ({old}) and new ({new})")]
    CountMismatch { old: usize, new: usize },
    /// The file has no readable link marker.
    #[display("no file id in {}", _0.display())]
    MissingFileId(#[error(not(source))] PathBuf),
    /// A copied file doesn't contain the identifier its original is recorded
    /// under, so the record no longer matches the file.
    #[display("{} doesn't carry recorded file id {file_id}", path.display())]
    StaleRecord { path: PathBuf, file_id: String },
    #[display("invalid configuration")]
    Config,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
