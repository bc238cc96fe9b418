use super::{
    ALL_CATEGORIES, Category, DeleteOutcome, FileFailure, GalleryError, GalleryItem,
    GalleryManager, ItemFilter, MediaType, MetadataUpdate, NewGalleryItem, SeedOutcome,
    UploadFile, UploadSummary, seed,
};
use crate::storage::BlobUpload;
use futures::future::join_all;
use std::path::Path;
use tracing::{debug, error, info, warn};

const OCTET_STREAM: &str = "application/octet-stream";

/// A file that passed validation, with every default resolved.
struct PreparedUpload {
    file_name: String,
    content_type: String,
    media_type: MediaType,
    title: String,
    description: String,
    category: Category,
}

impl GalleryManager {
    pub async fn list_items(&self, category: Option<&str>) -> Result<Vec<GalleryItem>, GalleryError> {
        let filter = match category.map(str::trim) {
            None | Some("") | Some(ALL_CATEGORIES) => ItemFilter::All,
            Some(value) => match value.parse::<Category>() {
                Ok(category) => ItemFilter::Category(category),
                Err(_) => {
                    debug!("No items can match unknown category '{}'", value);
                    return Ok(Vec::new());
                }
            },
        };

        let items = self.repository.find(filter).await?;
        debug!("Listed {} items for filter {:?}", items.len(), filter);
        Ok(items)
    }

    pub async fn get_item(&self, id: &str) -> Result<GalleryItem, GalleryError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))
    }

    pub async fn total_items(&self) -> Result<usize, GalleryError> {
        Ok(self.repository.count().await?)
    }

    /// Stores every file independently and persists the ones that made it.
    ///
    /// Succeeds when at least one file was stored; `items` follows the input
    /// order of the successful files. When every file fails the call returns
    /// `GalleryError::Upload` and nothing is persisted.
    pub async fn upload_batch(&self, files: Vec<UploadFile>) -> Result<UploadSummary, GalleryError> {
        if files.is_empty() {
            return Err(GalleryError::Validation("no files provided".to_string()));
        }

        let total = files.len();
        info!(
            "Uploading {} files via {} storage",
            total,
            self.blob_store.name()
        );

        let attempts = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| self.ingest_file(index, file));
        let results = join_all(attempts).await;

        let mut pending = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(item) => pending.push(item),
                Err(failure) => {
                    warn!(
                        "Upload of file #{} '{}' failed: {}",
                        failure.index, failure.file_name, failure.reason
                    );
                    failures.push(failure);
                }
            }
        }

        if pending.is_empty() {
            error!("All {} files in the batch failed", total);
            return Err(GalleryError::Upload { failures });
        }

        let stored_keys: Vec<String> = pending
            .iter()
            .filter_map(|item| item.storage_key.clone())
            .collect();

        let items = match self.repository.insert_many(pending).await {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to persist uploaded items: {}", e);
                self.remove_blobs(&stored_keys).await;
                return Err(e.into());
            }
        };

        info!(
            "Added {} items to the gallery ({} failed)",
            items.len(),
            failures.len()
        );
        Ok(UploadSummary { items, failures })
    }

    async fn ingest_file(&self, index: usize, file: UploadFile) -> Result<NewGalleryItem, FileFailure> {
        let prepared = self.prepare_upload(&file).map_err(|e| FileFailure {
            index,
            file_name: file.file_name.clone(),
            reason: e.to_string(),
        })?;

        let upload = BlobUpload::new(
            file.bytes.clone(),
            prepared.content_type.clone(),
            format!("{}/{}", prepared.category, prepared.file_name),
        );

        let stored = self.blob_store.store(upload).await.map_err(|e| FileFailure {
            index,
            file_name: file.file_name.clone(),
            reason: e.to_string(),
        })?;

        Ok(NewGalleryItem {
            media_type: prepared.media_type,
            src: stored.url,
            title: prepared.title,
            description: prepared.description,
            category: prepared.category,
            storage_key: Some(stored.key),
            file_name: prepared.file_name,
            file_size: file.bytes.len() as u64,
            mime_type: prepared.content_type,
        })
    }

    fn prepare_upload(&self, file: &UploadFile) -> Result<PreparedUpload, GalleryError> {
        // Browsers may send a full client path; only the final component is kept.
        let file_name = file
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        let content_type = resolve_content_type(file.content_type.as_deref(), &file_name);
        if !content_type.starts_with("image/") && !content_type.starts_with("video/") {
            return Err(GalleryError::Validation(format!(
                "unsupported content type '{}'",
                content_type
            )));
        }

        let size = file.bytes.len() as u64;
        if size == 0 {
            return Err(GalleryError::Validation("file is empty".to_string()));
        }
        if size > self.config.max_file_size_bytes {
            return Err(GalleryError::Validation(format!(
                "file is {} bytes, limit is {}",
                size, self.config.max_file_size_bytes
            )));
        }

        let title = file
            .metadata
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_title(&file_name));
        if title.is_empty() {
            return Err(GalleryError::Validation("title is required".to_string()));
        }

        let description = file
            .metadata
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        Ok(PreparedUpload {
            media_type: MediaType::from_content_type(&content_type),
            category: Category::parse_or_default(file.metadata.category.as_deref()),
            file_name,
            content_type,
            title,
            description,
        })
    }

    async fn remove_blobs(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.blob_store.delete(key).await {
                warn!(
                    "StorageCleanupWarning: could not remove orphaned blob {}: {}",
                    key, e
                );
            }
        }
    }

    /// Removes the record, then makes a best-effort attempt at its blob.
    ///
    /// The record goes first: a leftover blob is only a leak, while a record
    /// pointing at a missing blob shows up broken in the gallery.
    pub async fn delete_item(&self, id: &str) -> Result<DeleteOutcome, GalleryError> {
        let item = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))?;

        match item.storage_key.as_deref() {
            Some(key) => {
                if let Err(e) = self.blob_store.delete(key).await {
                    warn!(
                        "StorageCleanupWarning: item {} removed but blob {} was not: {}",
                        item.id, key, e
                    );
                }
            }
            None => debug!("Item {} is a seed item, no blob to remove", item.id),
        }

        let total_remaining = self.repository.count().await?;
        info!(
            "Deleted gallery item {} ('{}'), {} remaining",
            item.id, item.title, total_remaining
        );

        Ok(DeleteOutcome {
            item,
            total_remaining,
        })
    }

    pub async fn update_metadata(
        &self,
        id: &str,
        mut updates: MetadataUpdate,
    ) -> Result<GalleryItem, GalleryError> {
        if let Some(title) = updates.title.take() {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(GalleryError::Validation("title must not be empty".to_string()));
            }
            updates.title = Some(title);
        }
        updates.description = updates
            .description
            .map(|description| description.trim().to_string());

        let item = self
            .repository
            .update(id, updates)
            .await?
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))?;

        info!("Updated metadata for gallery item {}", item.id);
        Ok(item)
    }

    /// Inserts the default hotel photos into an empty gallery.
    pub async fn seed_defaults(&self) -> Result<SeedOutcome, GalleryError> {
        let existing = self.repository.count().await?;
        if existing > 0 {
            info!("Gallery already has {} items, seed skipped", existing);
            return Ok(SeedOutcome::Skipped { existing });
        }

        let items = self.repository.insert_many(seed::default_items()).await?;
        info!("Seeded {} default gallery items", items.len());
        Ok(SeedOutcome::Seeded(items))
    }
}

fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    match declared.map(str::trim) {
        Some(content_type)
            if !content_type.is_empty() && !content_type.eq_ignore_ascii_case(OCTET_STREAM) =>
        {
            content_type.to_ascii_lowercase()
        }
        _ => mime_guess::from_path(file_name)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string(),
    }
}

fn default_title(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .trim()
        .to_string()
}
