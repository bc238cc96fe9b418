use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::storage::{BlobStore, BlobUpload, StorageError, StoredBlob};

/// Embeds the binary in the record itself as a `data:` URI.
///
/// The key is the SHA-256 of the content; there is nothing to remove on
/// delete because the bytes go away with the record.
pub struct InlineStore;

impl InlineStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InlineStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InlineStore {
    async fn store(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError> {
        let digest = Sha256::digest(&upload.bytes);
        let key = format!("sha256:{:x}", digest);
        let url = format!(
            "data:{};base64,{}",
            upload.content_type,
            general_purpose::STANDARD.encode(&upload.bytes)
        );

        debug!("Encoded {} bytes inline as {}", upload.bytes.len(), key);
        Ok(StoredBlob { url, key })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        debug!("Inline blob {} released with its record", key);
        Ok(())
    }

    fn name(&self) -> &str {
        "Inline data URI"
    }
}
