mod error;
pub mod json_file;
pub mod memory;
mod table;

pub use error::RepositoryError;
pub use json_file::JsonFileRepository;
pub use memory::MemoryRepository;

use crate::gallery::{GalleryItem, ItemFilter, MetadataUpdate, NewGalleryItem};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};

/// The source of truth for gallery records.
///
/// Implementations assign ids and `uploaded_at`, keep each call atomic with
/// respect to the collection, and return `find` results newest first.
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn insert_many(
        &self,
        items: Vec<NewGalleryItem>,
    ) -> Result<Vec<GalleryItem>, RepositoryError>;

    async fn find(&self, filter: ItemFilter) -> Result<Vec<GalleryItem>, RepositoryError>;

    async fn get(&self, id: &str) -> Result<Option<GalleryItem>, RepositoryError>;

    async fn update(
        &self,
        id: &str,
        update: MetadataUpdate,
    ) -> Result<Option<GalleryItem>, RepositoryError>;

    /// Removes the record and returns it, or `None` when the id is unknown.
    async fn delete(&self, id: &str) -> Result<Option<GalleryItem>, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;

    fn name(&self) -> &str;

    async fn insert_one(&self, item: NewGalleryItem) -> Result<GalleryItem, RepositoryError> {
        self.insert_many(vec![item])
            .await?
            .pop()
            .ok_or_else(|| RepositoryError::Corrupt("insert returned no record".to_string()))
    }
}

pub type DynRepository = Arc<dyn GalleryRepository>;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Memory,
    Json(JsonDatabaseConfig),
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Json(JsonDatabaseConfig {
            path: PathBuf::from("data/gallery-data.json"),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonDatabaseConfig {
    pub path: PathBuf,
}

pub async fn create_repository(config: &DatabaseConfig) -> Result<DynRepository, RepositoryError> {
    match config {
        DatabaseConfig::Memory => Ok(Arc::new(MemoryRepository::new())),
        DatabaseConfig::Json(json_config) => {
            Ok(Arc::new(JsonFileRepository::open(&json_config.path).await?))
        }
    }
}
