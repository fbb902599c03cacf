//! In-memory link store for testing.

use crate::LinkStore;
use crate::error::{ErrorKind, Result};
use crate::record::LinkRecord;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use time::UtcDateTime;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    records: Vec<LinkRecord>,
    writes: usize,
}

/// In-memory link store for testing.
///
/// Mirrors the semantics of [`LinkRepository`](crate::LinkRepository),
/// including eviction of other records at a target path. Writes touching a
/// path registered with [`with_failing_path`](Self::with_failing_path) fail
/// with [`ErrorKind::Database`] without changing anything.
///
/// # Examples
///
/// ```ignore
/// use linkmap_store::{LinkStore, MemoryStore};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::with_records([("fs", "id-1", "/site/a.html")])
///     .with_failing_path("/site/b.html");
/// assert_eq!(store.find_by_id("fs", "id-1").await?.len(), 1);
/// assert!(store.insert("fs", "id-2", Path::new("/site/b.html")).await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    failing: HashSet<PathBuf>,
}

impl MemoryStore {
    /// Create a store pre-populated with `(scope, file_id, path)` records.
    pub fn with_records(
        records: impl IntoIterator<Item = (impl Into<String>, impl Into<String>, impl Into<PathBuf>)>,
    ) -> Self {
        let records = records.into_iter().map(|(scope, file_id, path)| LinkRecord::new(scope, file_id, path)).collect();
        Self {
            state: RwLock::new(State { records, writes: 0 }),
            failing: HashSet::new(),
        }
    }

    /// Make every write touching `path` fail.
    pub fn with_failing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Snapshot of every record, in insertion order.
    pub async fn records(&self) -> Vec<LinkRecord> {
        self.state.read().await.records.clone()
    }

    /// Number of successful writes since construction.
    pub async fn write_count(&self) -> usize {
        self.state.read().await.writes
    }

    fn check_writable<'a>(&self, paths: impl IntoIterator<Item = &'a Path>) -> Result<()> {
        for path in paths {
            if self.failing.contains(path) {
                tracing::debug!(path = %path.display(), "Injected write failure");
                exn::bail!(ErrorKind::Database);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn find_by_path(&self, scope: &str, path: &Path) -> Result<Vec<LinkRecord>> {
        let state = self.state.read().await;
        Ok(state.records.iter().filter(|r| r.scope == scope && r.path == path).cloned().collect())
    }

    async fn find_by_id(&self, scope: &str, file_id: &str) -> Result<Vec<LinkRecord>> {
        let state = self.state.read().await;
        let mut found: Vec<_> =
            state.records.iter().filter(|r| r.scope == scope && r.file_id == file_id).cloned().collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    async fn upsert_path_for_id(&self, scope: &str, file_id: &str, path: &Path) -> Result<bool> {
        self.check_writable([path])?;
        let mut state = self.state.write().await;
        if !state.records.iter().any(|r| r.scope == scope && r.file_id == file_id) {
            return Ok(false);
        }
        state.records.retain(|r| !(r.scope == scope && r.path == path && r.file_id != file_id));
        let target = state
            .records
            .iter_mut()
            .filter(|r| r.scope == scope && r.file_id == file_id)
            .min_by(|a, b| (a.path != path, &a.path).cmp(&(b.path != path, &b.path)));
        if let Some(record) = target {
            record.path = path.to_path_buf();
            record.updated_at = UtcDateTime::now();
        }
        state.writes += 1;
        Ok(true)
    }

    async fn insert(&self, scope: &str, file_id: &str, path: &Path) -> Result<LinkRecord> {
        self.check_writable([path])?;
        let record = LinkRecord::new(scope, file_id, path);
        let mut state = self.state.write().await;
        state.records.retain(|r| !(r.scope == scope && r.path == path));
        state.records.push(record.clone());
        state.writes += 1;
        Ok(record)
    }

    async fn remove_by_path(&self, scope: &str, path: &Path) -> Result<bool> {
        self.check_writable([path])?;
        let mut state = self.state.write().await;
        let before = state.records.len();
        state.records.retain(|r| !(r.scope == scope && r.path == path));
        let removed = state.records.len() < before;
        if removed {
            state.writes += 1;
        }
        Ok(removed)
    }

    async fn update_path_by_old_path(&self, scope: &str, old_path: &Path, new_path: &Path) -> Result<LinkRecord> {
        self.check_writable([old_path, new_path])?;
        let mut state = self.state.write().await;
        let Some(index) = state.records.iter().position(|r| r.scope == scope && r.path == old_path) else {
            exn::bail!(ErrorKind::NotFound(scope.to_string(), old_path.to_path_buf()));
        };
        let mut record = state.records.remove(index);
        state.records.retain(|r| !(r.scope == scope && r.path == new_path));
        record.path = new_path.to_path_buf();
        record.updated_at = UtcDateTime::now();
        state.records.push(record.clone());
        state.writes += 1;
        Ok(record)
    }
}
