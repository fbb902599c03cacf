//! Local filesystem implementation.
//!
//! Uses `tokio::fs` for async I/O. Directory listing never follows symbolic
//! links: every entry is inspected with `symlink_metadata` and anything that
//! is not a regular file or a directory is dropped.

use crate::error::{ErrorKind, Result};
use crate::FileSystem;
use async_trait::async_trait;
use futures::future::{BoxFuture, try_join_all};
use memchr::memmem::Finder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;

/// File extensions that can carry a link marker.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["html", "css"];

/// Local filesystem access, restricted to linkable file extensions.
///
/// # Examples
///
/// ```no_run
/// use linkmap_fs::{FileSystem, LocalFileSystem};
/// use std::path::Path;
///
/// # async fn example() -> linkmap_fs::error::Result<()> {
/// let fs = LocalFileSystem::new();
/// for path in fs.list_directory(Path::new("/srv/site")).await? {
///     println!("{}", path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    /// Extensions (without the leading dot) of files included in listings.
    extensions: Vec<String>,
}
impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}
impl LocalFileSystem {
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS)
    }

    /// Create a filesystem that lists files with the given extensions.
    ///
    /// Extensions are matched case-sensitively; a leading dot is optional.
    pub fn with_extensions(extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn is_linkable(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }

    /// List a directory and visit its children concurrently. Children are
    /// sorted by name first so that copies of a tree list in the same order
    /// as the original, whatever order `readdir` returns them in.
    fn walk_dir(&self, dir: PathBuf) -> BoxFuture<'_, Result<Vec<PathBuf>>> {
        Box::pin(async move {
            let mut entries = fs::read_dir(&dir).await.map_err(|e| ErrorKind::from_io(e, &dir))?;
            let mut children = Vec::new();
            while let Some(entry) = entries.next_entry().await.map_err(|e| ErrorKind::from_io(e, &dir))? {
                children.push(entry.path());
            }
            children.sort();
            let visited = try_join_all(children.into_iter().map(|child| self.visit(child))).await?;
            Ok(visited.into_iter().flatten().collect())
        })
    }

    async fn visit(&self, path: PathBuf) -> Result<Vec<PathBuf>> {
        let file_type = fs::symlink_metadata(&path).await.map_err(|e| ErrorKind::from_io(e, &path))?.file_type();
        if file_type.is_dir() {
            return self.walk_dir(path).await;
        }
        if file_type.is_file() && self.is_linkable(&path) {
            return Ok(vec![path]);
        }
        // Symlinks, sockets, FIFOs and unlinkable files.
        Ok(Vec::new())
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let metadata = fs::symlink_metadata(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(path.to_path_buf()));
        }
        let files = self.walk_dir(path.to_path_buf()).await?;
        tracing::trace!(path = %path.display(), count = files.len(), "Listed directory");
        Ok(files)
    }

    async fn read_head(&self, path: &Path, bytes: usize) -> Result<Option<Vec<u8>>> {
        let file = fs::File::open(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        let mut buffer = Vec::with_capacity(bytes);
        file.take(bytes as u64).read_to_end(&mut buffer).await.map_err(ErrorKind::Io)?;
        Ok((!buffer.is_empty()).then_some(buffer))
    }

    async fn replace_token(&self, path: &Path, from: &str, to: &str) -> Result<usize> {
        if from.is_empty() {
            return Ok(0);
        }
        let data = fs::read(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        let matches: Vec<usize> = Finder::new(from.as_bytes()).find_iter(&data).collect();
        if matches.is_empty() {
            return Ok(0);
        }
        let mut replaced = Vec::with_capacity(data.len());
        let mut last = 0;
        for at in &matches {
            replaced.extend_from_slice(&data[last..*at]);
            replaced.extend_from_slice(to.as_bytes());
            last = at + from.len();
        }
        replaced.extend_from_slice(&data[last..]);
        fs::write(path, replaced).await.map_err(|e| ErrorKind::from_io(e, path))?;
        Ok(matches.len())
    }
}
