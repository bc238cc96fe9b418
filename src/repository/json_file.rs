use super::{GalleryRepository, RepositoryError, table::ItemTable};
use crate::gallery::{GalleryItem, ItemFilter, MetadataUpdate, NewGalleryItem};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Gallery records kept in a single JSON document on disk.
///
/// The whole document is rewritten on every mutation while the write lock is
/// held. Mutations are applied to a copy first, so a failed write leaves both
/// the file and the in-memory view untouched.
pub struct JsonFileRepository {
    path: PathBuf,
    table: RwLock<ItemTable>,
}

impl JsonFileRepository {
    pub async fn open(path: &Path) -> Result<Self, RepositoryError> {
        let table = if tokio::fs::try_exists(path).await? {
            let contents = tokio::fs::read_to_string(path).await?;
            let table: ItemTable = serde_json::from_str(&contents)?;
            table.validate()?;
            info!(
                "Loaded {} gallery items from {:?}",
                table.items.len(),
                path
            );
            table
        } else {
            info!("Gallery database {:?} not found, creating it", path);
            let table = ItemTable::default();
            save_table(path, &table).await?;
            table
        };

        Ok(Self {
            path: path.to_path_buf(),
            table: RwLock::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn mutate<F, R>(&self, mutation: F) -> Result<R, RepositoryError>
    where
        F: FnOnce(&mut ItemTable) -> R + Send,
        R: Send,
    {
        let mut table = self.table.write().await;
        let mut next = table.clone();
        let result = mutation(&mut next);
        save_table(&self.path, &next).await?;
        *table = next;
        Ok(result)
    }
}

async fn save_table(path: &Path, table: &ItemTable) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(table)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!("Saved {} gallery items to {:?}", table.items.len(), path);
    Ok(())
}

#[async_trait]
impl GalleryRepository for JsonFileRepository {
    async fn insert_many(
        &self,
        items: Vec<NewGalleryItem>,
    ) -> Result<Vec<GalleryItem>, RepositoryError> {
        self.mutate(|table| table.insert(items)).await
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
        if self.table.read().await.get(id).is_none() {
            return Ok(None);
        }
        self.mutate(|table| table.update(id, update)).await
    }

    async fn delete(&self, id: &str) -> Result<Option<GalleryItem>, RepositoryError> {
        if self.table.read().await.get(id).is_none() {
            return Ok(None);
        }
        self.mutate(|table| table.delete(id)).await
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.table.read().await.len())
    }

    fn name(&self) -> &str {
        "JSON file"
    }
}
