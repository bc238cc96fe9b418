use super::*;
use crate::{
    GalleryConfig,
    repository::{GalleryRepository, MemoryRepository, RepositoryError},
    storage::{BlobStore, BlobUpload, StorageError, StoredBlob, unique_object_key},
};
use async_trait::async_trait;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

/// Records deletes and fails on demand.
#[derive(Default)]
struct FakeBlobStore {
    failing_names: HashSet<String>,
    fail_deletes: bool,
    stored: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeBlobStore {
    fn failing_on(names: &[&str]) -> Self {
        Self {
            failing_names: names.iter().map(|name| name.to_string()).collect(),
            ..Default::default()
        }
    }

    fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn store(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError> {
        let file_name = upload
            .suggested_name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if self.failing_names.contains(&file_name) {
            return Err(StorageError::ProviderError(format!(
                "refused to store {}",
                file_name
            )));
        }

        let key = unique_object_key(&upload.suggested_name);
        self.stored.lock().unwrap().push(key.clone());
        Ok(StoredBlob {
            url: format!("/fake/{}", key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.deleted.lock().unwrap().push(key.to_string());
        if self.fail_deletes {
            return Err(StorageError::ProviderError("delete refused".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Reads work, writes always fail.
#[derive(Default)]
struct BrokenRepository {
    inner: MemoryRepository,
}

#[async_trait]
impl GalleryRepository for BrokenRepository {
    async fn insert_many(
        &self,
        _items: Vec<NewGalleryItem>,
    ) -> Result<Vec<GalleryItem>, RepositoryError> {
        Err(RepositoryError::Corrupt("disk full".to_string()))
    }

    async fn find(&self, filter: ItemFilter) -> Result<Vec<GalleryItem>, RepositoryError> {
        self.inner.find(filter).await
    }

    async fn get(&self, id: &str) -> Result<Option<GalleryItem>, RepositoryError> {
        self.inner.get(id).await
    }

    async fn update(
        &self,
        id: &str,
        update: MetadataUpdate,
    ) -> Result<Option<GalleryItem>, RepositoryError> {
        self.inner.update(id, update).await
    }

    async fn delete(&self, id: &str) -> Result<Option<GalleryItem>, RepositoryError> {
        self.inner.delete(id).await
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        self.inner.count().await
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn test_config() -> GalleryConfig {
    GalleryConfig {
        max_file_size_bytes: 1024,
        ..Default::default()
    }
}

fn setup_with(store: FakeBlobStore) -> (GalleryManager, Arc<FakeBlobStore>) {
    let store = Arc::new(store);
    let manager = GalleryManager::new(
        test_config(),
        Arc::new(MemoryRepository::new()),
        store.clone(),
    );
    (manager, store)
}

fn setup() -> (GalleryManager, Arc<FakeBlobStore>) {
    setup_with(FakeBlobStore::default())
}

fn jpeg(name: &str) -> UploadFile {
    UploadFile::new(name, Some("image/jpeg".to_string()), b"jpeg-bytes".to_vec())
}

#[tokio::test]
async fn test_upload_single_file_with_category() {
    let (manager, _store) = setup();

    let summary = manager
        .upload_batch(vec![jpeg("pool.jpg").with_category("amenities")])
        .await
        .unwrap();

    assert_eq!(summary.created_count(), 1);
    assert_eq!(summary.failed_count(), 0);

    let item = &summary.items[0];
    assert_eq!(item.title, "pool");
    assert_eq!(item.description, "");
    assert_eq!(item.category, Category::Amenities);
    assert_eq!(item.media_type, MediaType::Image);
    assert_eq!(item.file_name, "pool.jpg");
    assert_eq!(item.file_size, 10);
    assert_eq!(item.mime_type, "image/jpeg");
    assert!(item.src.starts_with("/fake/amenities/"));
    assert!(item.storage_key.is_some());

    assert_eq!(manager.list_items(None).await.unwrap(), summary.items);
}

#[tokio::test]
async fn test_upload_partial_failure_keeps_successful_files() {
    let (manager, store) = setup_with(FakeBlobStore::failing_on(&["b.jpg"]));

    let summary = manager
        .upload_batch(vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")])
        .await
        .unwrap();

    assert_eq!(summary.created_count(), 2);
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.failures[0].index, 1);
    assert_eq!(summary.failures[0].file_name, "b.jpg");
    assert!(summary.failures[0].reason.contains("refused"));

    let titles: Vec<&str> = summary.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "c"]);
    assert_eq!(store.stored().len(), 2);
    assert_eq!(manager.total_items().await.unwrap(), 2);
}

#[tokio::test]
async fn test_upload_all_failures_is_an_error() {
    let (manager, _store) = setup_with(FakeBlobStore::failing_on(&["a.jpg", "b.jpg"]));

    let result = manager
        .upload_batch(vec![jpeg("a.jpg"), jpeg("b.jpg")])
        .await;

    match result {
        Err(GalleryError::Upload { failures }) => {
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].index, 0);
            assert_eq!(failures[1].index, 1);
        }
        other => panic!("expected upload error, got {:?}", other.map(|s| s.items)),
    }
    assert_eq!(manager.total_items().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upload_rejects_empty_batch() {
    let (manager, _store) = setup();
    assert!(matches!(
        manager.upload_batch(Vec::new()).await,
        Err(GalleryError::Validation(_))
    ));
}

#[tokio::test]
async fn test_upload_validation_failures_are_per_file() {
    let (manager, store) = setup();

    let summary = manager
        .upload_batch(vec![
            UploadFile::new("notes.txt", Some("text/plain".to_string()), b"hi".to_vec()),
            UploadFile::new("empty.png", Some("image/png".to_string()), Vec::new()),
            UploadFile::new("huge.jpg", Some("image/jpeg".to_string()), vec![0u8; 2048]),
            jpeg("ok.jpg"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.created_count(), 1);
    let failed: Vec<usize> = summary.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![0, 1, 2]);
    assert!(summary.failures[2].reason.contains("limit"));
    // Rejected files never reach storage
    assert_eq!(store.stored().len(), 1);
}

#[tokio::test]
async fn test_upload_guesses_type_and_detects_video() {
    let (manager, _store) = setup();

    let summary = manager
        .upload_batch(vec![
            UploadFile::new(
                "C:\\Users\\guest\\tour.mp4",
                Some("application/octet-stream".to_string()),
                b"mp4".to_vec(),
            ),
            UploadFile::new("lobby.png", None, b"png".to_vec()),
        ])
        .await
        .unwrap();

    let video = &summary.items[0];
    assert_eq!(video.media_type, MediaType::Video);
    assert_eq!(video.mime_type, "video/mp4");

    let image = &summary.items[1];
    assert_eq!(image.media_type, MediaType::Image);
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.title, "lobby");
}

#[tokio::test]
async fn test_upload_metadata_defaults_and_overrides() {
    let (manager, _store) = setup();

    let summary = manager
        .upload_batch(vec![
            jpeg("lounge.jpg").with_metadata(UploadMetadata {
                title: Some("  Sky Lounge ".to_string()),
                description: Some(" Top floor ".to_string()),
                category: Some("dining".to_string()),
            }),
            jpeg("hall.jpg").with_title("   ").with_category("ballroom"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.items[0].title, "Sky Lounge");
    assert_eq!(summary.items[0].description, "Top floor");
    assert_eq!(summary.items[0].category, Category::Dining);

    assert_eq!(summary.items[1].title, "hall");
    assert_eq!(summary.items[1].category, Category::Uploaded);
}

#[tokio::test]
async fn test_persistence_failure_removes_stored_blobs() {
    let store = Arc::new(FakeBlobStore::default());
    let manager = GalleryManager::new(
        test_config(),
        Arc::new(BrokenRepository::default()),
        store.clone(),
    );

    let result = manager
        .upload_batch(vec![jpeg("a.jpg"), jpeg("b.jpg")])
        .await;

    assert!(matches!(result, Err(GalleryError::Repository(_))));
    let mut stored = store.stored();
    let mut deleted = store.deleted();
    stored.sort();
    deleted.sort();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored, deleted);
}

#[tokio::test]
async fn test_list_filters_by_category_newest_first() {
    let (manager, _store) = setup();

    manager
        .upload_batch(vec![
            jpeg("suite.jpg").with_category("rooms"),
            jpeg("gala.jpg").with_category("events"),
        ])
        .await
        .unwrap();
    manager
        .upload_batch(vec![jpeg("twin.jpg").with_category("rooms")])
        .await
        .unwrap();

    let rooms = manager.list_items(Some("rooms")).await.unwrap();
    let titles: Vec<&str> = rooms.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["twin", "suite"]);

    let events = manager.list_items(Some("events")).await.unwrap();
    assert_eq!(events.len(), 1);

    let all = manager.list_items(Some("all")).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(manager.list_items(Some("")).await.unwrap(), all);
    assert_eq!(all[0].title, "twin");
    assert!(
        all.windows(2)
            .all(|pair| pair[0].uploaded_at > pair[1].uploaded_at)
    );

    // Category slices partition the full list
    let mut union = Vec::new();
    for category in Category::ALL {
        union.extend(manager.list_items(Some(category.as_str())).await.unwrap());
    }
    assert_eq!(union.len(), all.len());

    assert!(manager.list_items(Some("lobby")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_item_not_found() {
    let (manager, _store) = setup();
    assert!(matches!(
        manager.get_item("missing").await,
        Err(GalleryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_uploaded_item_removes_blob_once() {
    let (manager, store) = setup();

    let summary = manager
        .upload_batch(vec![jpeg("a.jpg"), jpeg("b.jpg")])
        .await
        .unwrap();
    let target = summary.items[0].clone();

    let outcome = manager.delete_item(&target.id).await.unwrap();
    assert_eq!(outcome.item.id, target.id);
    assert_eq!(outcome.total_remaining, 1);
    assert_eq!(store.deleted(), vec![target.storage_key.unwrap()]);

    assert!(matches!(
        manager.get_item(&target.id).await,
        Err(GalleryError::NotFound(_))
    ));
    assert!(matches!(
        manager.delete_item(&target.id).await,
        Err(GalleryError::NotFound(_))
    ));
    assert_eq!(store.deleted().len(), 1);
}

#[tokio::test]
async fn test_delete_seed_item_skips_storage() {
    let (manager, store) = setup();

    let SeedOutcome::Seeded(items) = manager.seed_defaults().await.unwrap() else {
        panic!("empty gallery should be seeded");
    };

    let outcome = manager.delete_item(&items[0].id).await.unwrap();
    assert!(outcome.item.is_seed());
    assert_eq!(outcome.total_remaining, items.len() - 1);
    assert!(store.deleted().is_empty());
}

#[tokio::test]
async fn test_delete_survives_storage_failure() {
    let (manager, store) = setup_with(FakeBlobStore {
        fail_deletes: true,
        ..Default::default()
    });

    let summary = manager.upload_batch(vec![jpeg("a.jpg")]).await.unwrap();
    let outcome = manager.delete_item(&summary.items[0].id).await.unwrap();

    assert_eq!(outcome.total_remaining, 0);
    assert_eq!(store.deleted().len(), 1);
    assert_eq!(manager.total_items().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_metadata_merges_fields() {
    let (manager, _store) = setup();

    let summary = manager
        .upload_batch(vec![jpeg("suite.jpg").with_category("rooms")])
        .await
        .unwrap();
    let original = summary.items[0].clone();

    let updated = manager
        .update_metadata(
            &original.id,
            MetadataUpdate {
                description: Some("  Ocean view ".to_string()),
                category: Some(Category::Amenities),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, original.title);
    assert_eq!(updated.description, "Ocean view");
    assert_eq!(updated.category, Category::Amenities);
    assert_eq!(updated.src, original.src);
    assert_eq!(updated.uploaded_at, original.uploaded_at);
    assert!(updated.updated_at.unwrap() > original.uploaded_at);

    assert_eq!(manager.get_item(&original.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_concurrent_disjoint_updates_both_persist() {
    let (manager, _store) = setup();
    let summary = manager.upload_batch(vec![jpeg("bar.jpg")]).await.unwrap();
    let id = summary.items[0].id.clone();

    let (first, second) = tokio::join!(
        manager.update_metadata(
            &id,
            MetadataUpdate {
                title: Some("Lobby Bar".to_string()),
                ..Default::default()
            },
        ),
        manager.update_metadata(
            &id,
            MetadataUpdate {
                description: Some("Open late".to_string()),
                ..Default::default()
            },
        ),
    );
    first.unwrap();
    second.unwrap();

    let item = manager.get_item(&id).await.unwrap();
    assert_eq!(item.title, "Lobby Bar");
    assert_eq!(item.description, "Open late");
}

#[tokio::test]
async fn test_update_metadata_rejects_blank_title_and_unknown_id() {
    let (manager, _store) = setup();
    let summary = manager.upload_batch(vec![jpeg("a.jpg")]).await.unwrap();

    let blank = manager
        .update_metadata(
            &summary.items[0].id,
            MetadataUpdate {
                title: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(blank, Err(GalleryError::Validation(_))));
    assert_eq!(
        manager.get_item(&summary.items[0].id).await.unwrap().title,
        "a"
    );

    let missing = manager
        .update_metadata("missing", MetadataUpdate::default())
        .await;
    assert!(matches!(missing, Err(GalleryError::NotFound(_))));
}

#[tokio::test]
async fn test_seed_only_populates_empty_gallery() {
    let (manager, _store) = setup();

    let SeedOutcome::Seeded(items) = manager.seed_defaults().await.unwrap() else {
        panic!("empty gallery should be seeded");
    };
    assert_eq!(items.len(), default_items().len());
    assert!(items.iter().all(GalleryItem::is_seed));

    match manager.seed_defaults().await.unwrap() {
        SeedOutcome::Skipped { existing } => assert_eq!(existing, items.len()),
        SeedOutcome::Seeded(_) => panic!("non-empty gallery must not be reseeded"),
    }
    assert_eq!(manager.total_items().await.unwrap(), items.len());
}

#[test]
fn test_error_status_codes() {
    use axum::http::StatusCode;

    assert_eq!(
        GalleryError::Validation("x".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        GalleryError::Upload { failures: vec![] }.status_code(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        GalleryError::NotFound("x".to_string()).status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        GalleryError::Unauthorized.status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        GalleryError::Storage(StorageError::ProviderError("x".to_string())).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
