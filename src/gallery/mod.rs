// Gallery module - Main entry point
mod core;
mod error;
mod handlers;
mod seed;
mod types;

// Re-export public items
pub use error::GalleryError;
pub use handlers::{
    delete_item_handler, get_item_handler, list_items_handler, seed_handler,
    update_item_handler, upload_handler,
};
pub use seed::default_items;
pub use types::*;

use crate::{
    Config,
    repository::{self, DynRepository},
    storage::{self, DynBlobStore},
};
use std::sync::Arc;

pub type SharedGallery = Arc<GalleryManager>;

/// Owns the gallery records and their blobs: uploads, listing, edits and
/// removal all go through here.
pub struct GalleryManager {
    pub(crate) config: crate::GalleryConfig,
    pub(crate) repository: DynRepository,
    pub(crate) blob_store: DynBlobStore,
}

impl GalleryManager {
    pub fn new(
        config: crate::GalleryConfig,
        repository: DynRepository,
        blob_store: DynBlobStore,
    ) -> Self {
        Self {
            config,
            repository,
            blob_store,
        }
    }

    /// Builds the configured persistence and storage backends.
    pub async fn from_config(config: &Config) -> Result<Self, GalleryError> {
        let repository = repository::create_repository(&config.database).await?;
        let blob_store = storage::create_blob_store(&config.storage).await?;

        tracing::info!(
            "Gallery using {} repository and {} storage",
            repository.name(),
            blob_store.name()
        );

        Ok(Self::new(config.gallery.clone(), repository, blob_store))
    }

    pub fn get_config(&self) -> &crate::GalleryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests;
