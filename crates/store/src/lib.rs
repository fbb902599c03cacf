//! Link record store.
//!
//! Maps file identifiers embedded in HTML/CSS files to the files' current
//! paths, namespaced per scope (one virtual filesystem). The store is not the
//! source of truth for identifiers, the files are; reconciliation rewrites
//! records to follow files around.
//!
//! # Architecture
//! - [`LinkStore`] is the narrow gateway every caller goes through.
//! - [`LinkRepository`] implements it on top of a SQLite [`Database`].
//! - `MemoryStore` (feature `mock`) implements it in memory for tests, with
//!   per-path write failure injection.

mod db;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod models;
mod record;
mod repo;

pub use crate::db::{Database, MAX_CONNECTIONS};
#[cfg(any(test, feature = "mock"))]
pub use crate::memory::MemoryStore;
pub use crate::record::LinkRecord;
pub use crate::repo::LinkRepository;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub type StoreHandle = Arc<dyn LinkStore + Send + Sync>;

/// Scoped CRUD gateway for link records.
///
/// # Invariant
/// At most one record exists per (scope, path). Operations that place a
/// record at a path remove any other record already there.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Find the records at a path. Zero or one is expected; more means the
    /// store is corrupt.
    async fn find_by_path(&self, scope: &str, path: &Path) -> Result<Vec<LinkRecord>>;

    /// Find the records carrying a file identifier.
    async fn find_by_id(&self, scope: &str, file_id: &str) -> Result<Vec<LinkRecord>>;

    /// Point the record for `file_id` at `path`. Never creates a record.
    ///
    /// Returns `false`, writing nothing, if no record carries the identifier.
    /// Should several records carry it, only one is moved: the one already at
    /// `path` if any, otherwise the first by path.
    async fn upsert_path_for_id(&self, scope: &str, file_id: &str, path: &Path) -> Result<bool>;

    /// Create a new record with a freshly generated link id.
    async fn insert(&self, scope: &str, file_id: &str, path: &Path) -> Result<LinkRecord>;

    /// Delete the record at a path.
    ///
    /// Returns `true` if a record was deleted, `false` if none existed.
    async fn remove_by_path(&self, scope: &str, path: &Path) -> Result<bool>;

    /// Move the record at `old_path` to `new_path`, keeping its identifier.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if no record
    /// exists at `old_path`.
    async fn update_path_by_old_path(&self, scope: &str, old_path: &Path, new_path: &Path) -> Result<LinkRecord>;
}
