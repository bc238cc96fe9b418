use super::{GalleryRepository, RepositoryError, table::ItemTable};
use crate::gallery::{GalleryItem, ItemFilter, MetadataUpdate, NewGalleryItem};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct MemoryRepository {
    table: RwLock<ItemTable>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GalleryRepository for MemoryRepository {
    async fn insert_many(
        &self,
        items: Vec<NewGalleryItem>,
    ) -> Result<Vec<GalleryItem>, RepositoryError> {
        Ok(self.table.write().await.insert(items))
    }

    async fn find(&self, filter: ItemFilter) -> Result<Vec<GalleryItem>, RepositoryError> {
        Ok(self.table.read().await.find(filter))
    }

    async fn get(&self, id: &str) -> Result<Option<GalleryItem>, RepositoryError> {
        Ok(self.table.read().await.get(id))
    }

    async fn update(
        &self,
        id: &str,
        update: MetadataUpdate,
    ) -> Result<Option<GalleryItem>, RepositoryError> {
        Ok(self.table.write().await.update(id, update))
    }

    async fn delete(&self, id: &str) -> Result<Option<GalleryItem>, RepositoryError> {
        Ok(self.table.write().await.delete(id))
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.table.read().await.len())
    }

    fn name(&self) -> &str {
        "In-memory"
    }
}
