use crate::context::Context;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};

/// The linkable files under a directory, in listing order.
///
/// Take one before moving a directory so the old paths can later be paired
/// with the listing of the new location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Snapshot {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }
}

pub async fn snapshot(ctx: &Context, dir: &Path) -> Result<Snapshot> {
    let files = ctx.fs.list_directory(dir).await.or_raise(|| ErrorKind::Filesystem)?;
    tracing::debug!(dir = %dir.display(), count = files.len(), "Took directory snapshot");
    Ok(Snapshot { root: dir.to_path_buf(), files })
}
