//! Bulk reconciliation after directory-level changes.
//!
//! Each operation walks the linkable files of a directory one at a time,
//! yielding to the runtime between files. A failure on one file is logged
//! and recorded in the returned [`Report`](crate::Report); it never stops
//! the others. Only failures that happen before any file is touched (a
//! listing that cannot be read, mismatched file counts) are returned as
//! errors.
//!
//! Copies and moves pair old and new files by position in their listings,
//! which relies on both trees holding the same relative file set.

mod copy;
mod moved;
mod refresh;
mod remove;

pub use self::copy::reconcile_on_copy;
pub use self::moved::reconcile_on_move;
pub use self::refresh::refresh_links_in_dir;
pub use self::remove::remove_links_recursive;
use crate::context::Context;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};

async fn list(ctx: &Context, dir: &Path) -> Result<Vec<PathBuf>> {
    ctx.fs.list_directory(dir).await.or_raise(|| ErrorKind::Filesystem)
}

fn ensure_same_count(old: usize, new: usize) -> Result<()> {
    if old != new {
        tracing::error!(old, new, "File count doesn't match between old and new");
        exn::bail!(ErrorKind::CountMismatch { old, new });
    }
    Ok(())
}
