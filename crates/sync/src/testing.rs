use crate::context::{Context, IdGenerator};
use async_trait::async_trait;
use linkmap_fs::error::{ErrorKind as FsErrorKind, Result as FsResult};
use linkmap_fs::{FileSystem, LocalFileSystem};
use linkmap_store::MemoryStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) const SCOPE: &str = "fs";

/// Hands out `id-1`, `id-2`, ... in order.
#[derive(Default)]
pub(crate) struct SequentialIds(AtomicUsize);

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        format!("id-{}", self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Local filesystem whose listings fail, as when a nested directory vanishes
/// partway through a walk.
pub(crate) struct BrokenListing(LocalFileSystem);

#[async_trait]
impl FileSystem for BrokenListing {
    async fn list_directory(&self, path: &Path) -> FsResult<Vec<PathBuf>> {
        exn::bail!(FsErrorKind::NotFound(path.join("vanished")));
    }

    async fn read_head(&self, path: &Path, bytes: usize) -> FsResult<Option<Vec<u8>>> {
        self.0.read_head(path, bytes).await
    }

    async fn replace_token(&self, path: &Path, from: &str, to: &str) -> FsResult<usize> {
        self.0.replace_token(path, from, to).await
    }
}

pub(crate) fn broken_listing_context(store: Arc<MemoryStore>) -> Context {
    Context::new(store, Arc::new(BrokenListing(LocalFileSystem::new())))
}

pub(crate) fn context(store: Arc<MemoryStore>) -> Context {
    Context::new(store, Arc::new(LocalFileSystem::new())).with_id_generator(Arc::new(SequentialIds::default()))
}

/// Write a file carrying a marker for `file_id`, which also appears again
/// further down as a link target.
pub(crate) fn write_linked(root: &Path, relative: &str, file_id: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, format!("<!-- fileId:{file_id} -->\n<a href=\"/download/{file_id}\">get</a>\n")).unwrap();
    path
}

pub(crate) fn marker_of(path: &Path) -> String {
    let contents = std::fs::read_to_string(path).unwrap();
    linkmap_fs::parse_file_id(&contents).unwrap().to_string()
}
