//! SQLite-backed link repository.

use crate::Database;
use crate::LinkStore;
use crate::error::{ErrorKind, Result};
use crate::models::LinkRow;
use crate::record::LinkRecord;
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;
use time::UtcDateTime;

/// Repository for link records in the SQLite database.
///
/// Every write that places a record at a path first evicts whatever other
/// record occupies that (scope, path), inside the same transaction, so the
/// one-record-per-path invariant holds even when the store has drifted from
/// the filesystem.
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: SqlitePool,
}
impl From<&Database> for LinkRepository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl LinkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn path_text(path: &Path) -> Result<String> {
        Ok(path.to_str().ok_or_raise(|| ErrorKind::InvalidData("path"))?.to_string())
    }

    async fn fetch(&self, query: &'static str, scope: &str, key: &str) -> Result<Vec<LinkRecord>> {
        let rows: Vec<LinkRow> = sqlx::query_as(query)
            .bind(scope)
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(LinkRecord::try_from).collect()
    }

    async fn insert_row(conn: &mut SqliteConnection, row: &LinkRow) -> Result<()> {
        sqlx::query(include_str!("../queries/insert.sql"))
            .bind(&row.link_id)
            .bind(&row.scope)
            .bind(&row.file_id)
            .bind(&row.path)
            .bind(row.updated_at)
            .execute(conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}

#[async_trait]
impl LinkStore for LinkRepository {
    async fn find_by_path(&self, scope: &str, path: &Path) -> Result<Vec<LinkRecord>> {
        self.fetch(include_str!("../queries/find_by_path.sql"), scope, &Self::path_text(path)?).await
    }

    async fn find_by_id(&self, scope: &str, file_id: &str) -> Result<Vec<LinkRecord>> {
        self.fetch(include_str!("../queries/find_by_id.sql"), scope, file_id).await
    }

    async fn upsert_path_for_id(&self, scope: &str, file_id: &str, path: &Path) -> Result<bool> {
        let path = Self::path_text(path)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let target: Option<(String,)> = sqlx::query_as(include_str!("../queries/find_link_for_id.sql"))
            .bind(scope)
            .bind(file_id)
            .bind(&path)
            .fetch_optional(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let Some((link_id,)) = target else {
            return Ok(false);
        };
        sqlx::query(include_str!("../queries/evict_path.sql"))
            .bind(scope)
            .bind(&path)
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../queries/update_path_by_link_id.sql"))
            .bind(&path)
            .bind(UtcDateTime::now().unix_timestamp())
            .bind(&link_id)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(true)
    }

    async fn insert(&self, scope: &str, file_id: &str, path: &Path) -> Result<LinkRecord> {
        let record = LinkRecord::new(scope, file_id, path);
        let row = LinkRow::try_from(&record)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../queries/remove_by_path.sql"))
            .bind(&row.scope)
            .bind(&row.path)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Self::insert_row(&mut *tx, &row).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(record)
    }

    async fn remove_by_path(&self, scope: &str, path: &Path) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/remove_by_path.sql"))
            .bind(scope)
            .bind(Self::path_text(path)?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_path_by_old_path(&self, scope: &str, old_path: &Path, new_path: &Path) -> Result<LinkRecord> {
        let old = Self::path_text(old_path)?;
        let new = Self::path_text(new_path)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let existing: Option<LinkRow> = sqlx::query_as(include_str!("../queries/find_by_path.sql"))
            .bind(scope)
            .bind(&old)
            .fetch_optional(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let mut row = existing.ok_or_raise(|| ErrorKind::NotFound(scope.to_string(), old_path.to_path_buf()))?;
        if old != new {
            sqlx::query(include_str!("../queries/remove_by_path.sql"))
                .bind(scope)
                .bind(&new)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        row.path = new;
        row.updated_at = UtcDateTime::now().unix_timestamp();
        sqlx::query(include_str!("../queries/update_by_old_path.sql"))
            .bind(&row.file_id)
            .bind(&row.path)
            .bind(row.updated_at)
            .bind(scope)
            .bind(&old)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        LinkRecord::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn repository() -> LinkRepository {
        let db = Database::connect_in_memory().await.unwrap();
        LinkRepository::from(&db)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = repository().await;
        let record = repo.insert("fs1", "id-a", Path::new("/site/a.html")).await.unwrap();
        let by_path = repo.find_by_path("fs1", Path::new("/site/a.html")).await.unwrap();
        assert_eq!(by_path.len(), 1);
        assert_eq!(by_path[0].link_id, record.link_id);
        assert_eq!(by_path[0].file_id, "id-a");
        let by_id = repo.find_by_id("fs1", "id-a").await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].path, PathBuf::from("/site/a.html"));
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let repo = repository().await;
        repo.insert("fs1", "id-a", Path::new("/a.html")).await.unwrap();
        repo.insert("fs2", "id-a", Path::new("/a.html")).await.unwrap();
        assert!(repo.find_by_path("fs3", Path::new("/a.html")).await.unwrap().is_empty());
        assert!(repo.remove_by_path("fs1", Path::new("/a.html")).await.unwrap());
        assert_eq!(repo.find_by_id("fs2", "id-a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_replaces_record_at_same_path() {
        let repo = repository().await;
        repo.insert("fs1", "old", Path::new("/a.html")).await.unwrap();
        repo.insert("fs1", "new", Path::new("/a.html")).await.unwrap();
        let records = repo.find_by_path("fs1", Path::new("/a.html")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_id, "new");
        assert!(repo.find_by_id("fs1", "old").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_id() {
        let repo = repository().await;
        let record = repo.insert("fs1", "id-a", Path::new("/a.html")).await.unwrap();
        assert!(repo.upsert_path_for_id("fs1", "id-a", Path::new("/moved/a.html")).await.unwrap());
        let records = repo.find_by_id("fs1", "id-a").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].link_id, record.link_id);
        assert_eq!(records[0].path, PathBuf::from("/moved/a.html"));
        assert!(repo.find_by_path("fs1", Path::new("/a.html")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_never_creates_records() {
        let repo = repository().await;
        repo.insert("fs1", "stale", Path::new("/b.css")).await.unwrap();
        assert!(!repo.upsert_path_for_id("fs1", "fresh", Path::new("/b.css")).await.unwrap());
        // Nothing was written, not even the eviction of the record at the path.
        let records = repo.find_by_path("fs1", Path::new("/b.css")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_id, "stale");
        assert!(repo.find_by_id("fs1", "fresh").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_evicts_other_record_at_path() {
        let repo = repository().await;
        repo.insert("fs1", "stale", Path::new("/a.html")).await.unwrap();
        repo.insert("fs1", "id-a", Path::new("/b.html")).await.unwrap();
        repo.upsert_path_for_id("fs1", "id-a", Path::new("/a.html")).await.unwrap();
        let records = repo.find_by_path("fs1", Path::new("/a.html")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_id, "id-a");
        assert!(repo.find_by_id("fs1", "stale").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_with_duplicate_ids_moves_one_record() {
        let repo = repository().await;
        repo.insert("fs1", "dup", Path::new("/b.html")).await.unwrap();
        repo.insert("fs1", "dup", Path::new("/c.html")).await.unwrap();
        repo.upsert_path_for_id("fs1", "dup", Path::new("/c.html")).await.unwrap();
        assert_eq!(repo.find_by_id("fs1", "dup").await.unwrap().len(), 2);
        repo.upsert_path_for_id("fs1", "dup", Path::new("/a.html")).await.unwrap();
        let paths: Vec<_> = repo.find_by_id("fs1", "dup").await.unwrap().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec![PathBuf::from("/a.html"), PathBuf::from("/c.html")]);
    }

    #[tokio::test]
    async fn test_remove_by_path() {
        let repo = repository().await;
        repo.insert("fs1", "id-a", Path::new("/a.html")).await.unwrap();
        assert!(repo.remove_by_path("fs1", Path::new("/a.html")).await.unwrap());
        assert!(!repo.remove_by_path("fs1", Path::new("/a.html")).await.unwrap());
        assert!(repo.find_by_path("fs1", Path::new("/a.html")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_path_by_old_path() {
        let repo = repository().await;
        let record = repo.insert("fs1", "id-a", Path::new("/d/a.html")).await.unwrap();
        let moved = repo.update_path_by_old_path("fs1", Path::new("/d/a.html"), Path::new("/d2/a.html")).await.unwrap();
        assert_eq!(moved.link_id, record.link_id);
        assert_eq!(moved.file_id, "id-a");
        assert_eq!(moved.path, PathBuf::from("/d2/a.html"));
        assert!(repo.find_by_path("fs1", Path::new("/d/a.html")).await.unwrap().is_empty());
        assert_eq!(repo.find_by_path("fs1", Path::new("/d2/a.html")).await.unwrap(), vec![moved]);
    }

    #[tokio::test]
    async fn test_update_path_by_old_path_not_found() {
        let repo = repository().await;
        let err = repo.update_path_by_old_path("fs1", Path::new("/nope.html"), Path::new("/x.html")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(scope, path) if scope == "fs1" && path == Path::new("/nope.html")));
    }

    #[tokio::test]
    async fn test_update_path_by_old_path_to_same_path() {
        let repo = repository().await;
        repo.insert("fs1", "id-a", Path::new("/a.html")).await.unwrap();
        let record = repo.update_path_by_old_path("fs1", Path::new("/a.html"), Path::new("/a.html")).await.unwrap();
        assert_eq!(record.file_id, "id-a");
        assert_eq!(repo.find_by_path("fs1", Path::new("/a.html")).await.unwrap().len(), 1);
    }
}
