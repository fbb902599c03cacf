use super::list;
use crate::context::Context;
use crate::error::{ErrorKind, Result};
use crate::report::{Outcome, Report, SkipReason};
use std::path::Path;
use tracing::instrument;

/// Remove the record of every linkable file under `dir`.
///
/// Run this before the directory itself is deleted: the files have to be
/// listed while they still exist.
#[instrument(skip(ctx, dir), fields(dir = %dir.display()))]
pub async fn remove_links_recursive(ctx: &Context, scope: &str, dir: &Path) -> Result<Report> {
    let files = list(ctx, dir).await?;
    let mut report = Report::with_capacity(files.len());
    for path in files {
        let outcome = match ctx.store.remove_by_path(scope, &path).await {
            Ok(true) => Outcome::Removed,
            Ok(false) => Outcome::Skipped(SkipReason::NoRecord),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = ?e, "Failed to remove file link");
                Outcome::Failed(e.raise(ErrorKind::Store))
            },
        };
        report.push(path, outcome);
        tokio::task::yield_now().await;
    }
    tracing::info!(files = report.len(), failed = report.failures().count(), "Removed file links");
    Ok(report)
}
