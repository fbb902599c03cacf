use super::list;
use crate::context::Context;
use crate::error::{ErrorKind, Result};
use crate::link::read_file_id;
use crate::report::{Outcome, Report, SkipReason};
use exn::ResultExt;
use std::path::Path;
use tracing::instrument;

/// Re-record the current path of every linked file under `dir`.
///
/// Used when files may have changed on disk without passing through the
/// copy or move hooks. Files without a marker, and files whose identifier
/// has no record, are skipped; no record is ever created.
#[instrument(skip(ctx, dir), fields(dir = %dir.display()))]
pub async fn refresh_links_in_dir(ctx: &Context, scope: &str, dir: &Path) -> Result<Report> {
    let files = list(ctx, dir).await?;
    let mut report = Report::with_capacity(files.len());
    for path in files {
        let outcome = match refresh_file(ctx, scope, &path).await {
            Ok(Refresh::Updated(file_id)) => Outcome::Refreshed { file_id },
            Ok(Refresh::NoRecord) => Outcome::Skipped(SkipReason::NoRecord),
            Ok(Refresh::NoFileId) => Outcome::Skipped(SkipReason::NoFileId),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = ?e, "Failed to refresh file link");
                Outcome::Failed(e)
            },
        };
        report.push(path, outcome);
        tokio::task::yield_now().await;
    }
    tracing::info!(files = report.len(), failed = report.failures().count(), "Refreshed file links");
    Ok(report)
}

enum Refresh {
    Updated(String),
    NoRecord,
    NoFileId,
}

async fn refresh_file(ctx: &Context, scope: &str, path: &Path) -> Result<Refresh> {
    let Some(file_id) = read_file_id(ctx, path).await? else {
        return Ok(Refresh::NoFileId);
    };
    if ctx.store.upsert_path_for_id(scope, &file_id, path).await.or_raise(|| ErrorKind::Store)? {
        Ok(Refresh::Updated(file_id))
    } else {
        Ok(Refresh::NoRecord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SCOPE, context, write_linked};
    use linkmap_store::{LinkStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_refresh() {
        let temp_dir = tempfile::tempdir().unwrap();
        let a = write_linked(temp_dir.path(), "a.html", "A");
        let b = write_linked(temp_dir.path(), "sub/b.css", "B");
        let plain = temp_dir.path().join("plain.html");
        std::fs::write(&plain, "<p>no marker</p>").unwrap();
        let store = Arc::new(MemoryStore::with_records([(SCOPE, "A", "/stale/a.html")]));
        let ctx = context(store.clone());

        let report = refresh_links_in_dir(&ctx, SCOPE, temp_dir.path()).await.unwrap();
        assert!(report.is_clean());
        assert_eq!(report.len(), 3);
        assert!(matches!(report.get(&a), Some(Outcome::Refreshed { file_id }) if file_id == "A"));
        assert!(matches!(report.get(&b), Some(Outcome::Skipped(SkipReason::NoRecord))));
        assert!(matches!(report.get(&plain), Some(Outcome::Skipped(SkipReason::NoFileId))));
        assert_eq!(store.find_by_id(SCOPE, "A").await.unwrap()[0].path, a);
        assert!(store.find_by_id(SCOPE, "B").await.unwrap().is_empty());
        assert_eq!(store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_never_links_unrecorded_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let page = temp_dir.path().join("page.html");
        std::fs::write(&page, "<!-- Author: Jane -->\n<p>never linked</p>").unwrap();
        let store = Arc::new(MemoryStore::default());
        let ctx = context(store.clone());

        let report = refresh_links_in_dir(&ctx, SCOPE, temp_dir.path()).await.unwrap();
        assert!(matches!(report.get(&page), Some(Outcome::Skipped(SkipReason::NoRecord))));
        assert!(store.records().await.is_empty());
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_stop_the_rest() {
        let temp_dir = tempfile::tempdir().unwrap();
        let a = write_linked(temp_dir.path(), "a.html", "A");
        let b = write_linked(temp_dir.path(), "b.html", "B");
        let store = Arc::new(
            MemoryStore::with_records([(SCOPE, "A", "/old/a.html"), (SCOPE, "B", "/old/b.html")]).with_failing_path(&a),
        );
        let ctx = context(store.clone());

        let report = refresh_links_in_dir(&ctx, SCOPE, temp_dir.path()).await.unwrap();
        assert!(matches!(report.get(&a), Some(Outcome::Failed(e)) if matches!(&**e, ErrorKind::Store)));
        assert!(matches!(report.get(&b), Some(Outcome::Refreshed { .. })));
        assert_eq!(store.find_by_path(SCOPE, &b).await.unwrap().len(), 1);
    }
}
