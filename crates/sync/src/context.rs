use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use linkmap_config::Config;
use linkmap_fs::{DEFAULT_HEAD_BYTES, FsHandle, LocalFileSystem};
use linkmap_store::{Database, LinkRepository, StoreHandle};
use std::sync::Arc;

/// Source of fresh file identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

pub type IdHandle = Arc<dyn IdGenerator + Send + Sync>;

/// Random (v4) UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Everything a reconciliation operation needs: the link store, the
/// filesystem, and how to mint identifiers.
#[derive(Clone)]
pub struct Context {
    pub store: StoreHandle,
    pub fs: FsHandle,
    pub ids: IdHandle,
    /// Number of leading bytes searched for a link marker.
    pub head_bytes: usize,
}

impl Context {
    pub fn new(store: StoreHandle, fs: FsHandle) -> Self {
        Self {
            store,
            fs,
            ids: Arc::new(UuidGenerator),
            head_bytes: DEFAULT_HEAD_BYTES,
        }
    }

    pub fn with_id_generator(mut self, ids: IdHandle) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_head_bytes(mut self, head_bytes: usize) -> Self {
        self.head_bytes = head_bytes;
        self
    }

    /// Open the configured SQLite database (creating its parent directory if
    /// needed) and pair it with the local filesystem.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate().or_raise(|| ErrorKind::Config)?;
        if let Some(parent) = config.database.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Filesystem)?;
        }
        let db = Database::connect_with_limit(&config.database.path, config.database.max_connections)
            .await
            .or_raise(|| ErrorKind::Store)?;
        tracing::info!(database = %config.database.path.display(), "Opened link store");
        let store: StoreHandle = Arc::new(LinkRepository::from(&db));
        let fs: FsHandle = Arc::new(LocalFileSystem::with_extensions(config.scan.extensions.iter().cloned()));
        Ok(Self::new(store, fs).with_head_bytes(config.scan.head_bytes))
    }
}
