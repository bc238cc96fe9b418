use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::storage::{
    BlobStore, BlobUpload, LocalStorageConfig, StorageError, StoredBlob, unique_object_key,
};

/// Writes blobs under a directory that the router serves at `url_prefix`.
pub struct LocalStore {
    directory: PathBuf,
    url_prefix: String,
}

impl LocalStore {
    pub fn new(config: &LocalStorageConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            url_prefix: config.mount_path(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.directory.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn store(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError> {
        let key = unique_object_key(&upload.suggested_name);
        let path = self.resolve(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &upload.bytes).await?;
        debug!("Stored {} bytes at {:?}", upload.bytes.len(), path);

        Ok(StoredBlob {
            url: format!("{}/{}", self.url_prefix, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(&path).await?;
        debug!("Removed {:?}", path);
        Ok(())
    }

    fn name(&self) -> &str {
        "Local directory"
    }
}
