pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Object storage for uploaded media binaries.
///
/// `store` hands back both the public reference written into the gallery
/// record and the key needed to delete the blob later. Failures are returned,
/// never raised as panics, so a batch upload can keep going past them.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
    fn name(&self) -> &str;
}

pub type DynBlobStore = Arc<dyn BlobStore>;

pub async fn create_blob_store(config: &StorageConfig) -> Result<DynBlobStore, StorageError> {
    match config {
        StorageConfig::S3(s3_config) => Ok(Arc::new(providers::s3::S3Store::new(s3_config).await?)),
        StorageConfig::Local(local_config) => {
            Ok(Arc::new(providers::local::LocalStore::new(local_config)))
        }
        StorageConfig::Inline => Ok(Arc::new(providers::inline::InlineStore::new())),
    }
}
