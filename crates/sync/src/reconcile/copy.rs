use super::{ensure_same_count, list};
use crate::context::Context;
use crate::error::{ErrorKind, Result};
use crate::link::create_link_for_file;
use crate::report::{Outcome, Report, SkipReason};
use std::path::Path;
use tracing::instrument;

/// Give every file in a freshly copied directory its own identifier.
///
/// Files of `old_dir` and `new_dir` are paired by position. For each pair:
/// - if the original has a record, the old identifier in the copy is
///   replaced with a new one and a record is inserted for it. A copy that
///   doesn't contain the recorded identifier fails with
///   [`ErrorKind::StaleRecord`] and is left untouched;
/// - otherwise the copy is linked from scratch via
///   [`create_link_for_file`], and skipped if it has no marker.
///
/// The original's record is never changed.
///
/// # Errors
/// Returns [`ErrorKind::CountMismatch`] when the listings differ in length,
/// before anything is written.
#[instrument(skip(ctx, old_dir, new_dir), fields(old = %old_dir.display(), new = %new_dir.display()))]
pub async fn reconcile_on_copy(ctx: &Context, scope: &str, old_dir: &Path, new_dir: &Path) -> Result<Report> {
    let old_files = list(ctx, old_dir).await?;
    let new_files = list(ctx, new_dir).await?;
    ensure_same_count(old_files.len(), new_files.len())?;

    let mut report = Report::with_capacity(new_files.len());
    for (old_path, new_path) in old_files.iter().zip(new_files) {
        let outcome = copy_file(ctx, scope, old_path, &new_path).await;
        report.push(new_path, outcome);
        tokio::task::yield_now().await;
    }
    tracing::info!(files = report.len(), failed = report.failures().count(), "Reconciled copied directory");
    Ok(report)
}

async fn copy_file(ctx: &Context, scope: &str, old_path: &Path, new_path: &Path) -> Outcome {
    let source = match ctx.store.find_by_path(scope, old_path).await {
        Ok(records) => {
            if records.len() > 1 {
                tracing::warn!(path = %old_path.display(), count = records.len(), "Multiple link records for one path");
            }
            records.into_iter().next()
        },
        Err(e) => {
            // Treated as unrecorded: the copy still needs an identifier of its own.
            tracing::warn!(path = %old_path.display(), error = ?e, "Failed to look up link of copied file");
            None
        },
    };

    let Some(source) = source else {
        return match create_link_for_file(ctx, scope, new_path).await {
            Ok(file_id) => Outcome::Linked { file_id },
            Err(e) if matches!(&*e, ErrorKind::MissingFileId(_)) => {
                tracing::warn!(path = %new_path.display(), "Copied file has no file id; skipping");
                Outcome::Skipped(SkipReason::NoFileId)
            },
            Err(e) => {
                tracing::error!(path = %new_path.display(), error = ?e, "Failed to link copied file");
                Outcome::Failed(e)
            },
        };
    };

    let new_id = ctx.ids.generate();
    let replaced = match ctx.fs.replace_token(new_path, &source.file_id, &new_id).await {
        Ok(replaced) => replaced,
        Err(e) => {
            tracing::error!(path = %new_path.display(), error = ?e, "Failed to rewrite file id of copied file");
            return Outcome::Failed(e.raise(ErrorKind::Filesystem));
        },
    };
    if replaced == 0 {
        tracing::warn!(
            path = %new_path.display(),
            file_id = %source.file_id,
            "Copied file doesn't carry its recorded file id"
        );
        return Outcome::Failed(exn::Exn::from(ErrorKind::StaleRecord {
            path: new_path.to_path_buf(),
            file_id: source.file_id,
        }));
    }
    // The copy keeps its new identifier even when the record can't be stored.
    match ctx.store.insert(scope, &new_id, new_path).await {
        Ok(_) => Outcome::Relinked { from: source.file_id, to: new_id },
        Err(e) => {
            tracing::error!(path = %new_path.display(), error = ?e, "Failed to insert link of copied file");
            Outcome::Failed(e.raise(ErrorKind::Store))
        },
    }
}
