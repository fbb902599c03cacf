use super::{ensure_same_count, list};
use crate::context::Context;
use crate::error::{ErrorKind, Result};
use crate::report::{Outcome, Report, SkipReason};
use linkmap_store::error::ErrorKind as StoreErrorKind;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Point the records of moved files at their new paths.
///
/// `old_files` is the listing of the directory taken before it was moved
/// (see [`snapshot`](crate::snapshot)); it is paired by position with the
/// listing of `new_dir`. Identifiers are kept, and files are not rewritten.
///
/// # Errors
/// Returns [`ErrorKind::CountMismatch`] when the listings differ in length,
/// before anything is written.
#[instrument(skip(ctx, old_files, new_dir), fields(files = old_files.len(), new = %new_dir.display()))]
pub async fn reconcile_on_move(ctx: &Context, scope: &str, old_files: &[PathBuf], new_dir: &Path) -> Result<Report> {
    let new_files = list(ctx, new_dir).await?;
    ensure_same_count(old_files.len(), new_files.len())?;

    let mut report = Report::with_capacity(new_files.len());
    for (old_path, new_path) in old_files.iter().zip(new_files) {
        let outcome = match ctx.store.update_path_by_old_path(scope, old_path, &new_path).await {
            Ok(record) => Outcome::Moved { file_id: record.file_id },
            Err(e) if matches!(&*e, StoreErrorKind::NotFound(..)) => {
                tracing::debug!(path = %old_path.display(), "Moved file has no link record");
                Outcome::Skipped(SkipReason::NoRecord)
            },
            Err(e) => {
                tracing::warn!(from = %old_path.display(), to = %new_path.display(), error = ?e, "Failed to move file link");
                Outcome::Failed(e.raise(ErrorKind::Store))
            },
        };
        report.push(new_path, outcome);
        tokio::task::yield_now().await;
    }
    tracing::info!(files = report.len(), failed = report.failures().count(), "Reconciled moved directory");
    Ok(report)
}
