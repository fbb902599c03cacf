//! Filesystem access for link reconciliation.
//!
//! Everything the reconciler needs from a filesystem is behind the
//! [`FileSystem`] trait: listing the linkable files under a directory,
//! reading the leading bytes of a file (where its link marker lives), and
//! substituting one file identifier for another inside a file.

pub mod error;
mod local;
mod marker;

pub use crate::local::{DEFAULT_EXTENSIONS, LocalFileSystem};
pub use crate::marker::{DEFAULT_HEAD_BYTES, parse_file_id, read_file_id};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type FsHandle = Arc<dyn FileSystem + Send + Sync>;

/// Unified interface for the filesystem operations used by reconciliation.
///
/// Paths are passed through as given; implementations do not resolve them
/// against any root.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Recursively list the linkable files under `path`.
    ///
    /// The order is stable for an unchanged tree, and two trees with the same
    /// relative file set list their files in the same positional order.
    ///
    /// Returns [`NotADirectory`](crate::error::ErrorKind::NotADirectory) if
    /// `path` is not a directory. Any other failure aborts the whole listing.
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Read at most the first `bytes` bytes of a file.
    ///
    /// Returns `None` when the file is empty.
    async fn read_head(&self, path: &Path, bytes: usize) -> Result<Option<Vec<u8>>>;

    /// Replace every occurrence of `from` with `to` in the file at `path`.
    ///
    /// Returns the number of replacements made. The file is left untouched
    /// when there is nothing to replace.
    async fn replace_token(&self, path: &Path, from: &str, to: &str) -> Result<usize>;
}
