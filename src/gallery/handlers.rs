use super::{
    FileFailure, GalleryError, GalleryItem, MetadataUpdate, SeedOutcome, UpdateItemPayload,
    UploadFile, UploadMetadata, UploadSummary,
};
use crate::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::Field},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

fn require_admin(headers: &HeaderMap, app_state: &AppState) -> Result<(), GalleryError> {
    if crate::api::is_admin(headers, &app_state.config.app.session_secret) {
        Ok(())
    } else {
        warn!("Rejected gallery mutation without a valid admin session");
        Err(GalleryError::Unauthorized)
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    items: Vec<GalleryItem>,
    total: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    items: Vec<GalleryItem>,
    created_count: usize,
    failed_count: usize,
    failures: Vec<FileFailure>,
}

impl From<UploadSummary> for UploadResponse {
    fn from(summary: UploadSummary) -> Self {
        Self {
            created_count: summary.created_count(),
            failed_count: summary.failed_count(),
            items: summary.items,
            failures: summary.failures,
        }
    }
}

#[derive(Serialize)]
pub struct ItemResponse {
    item: GalleryItem,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    success: bool,
    total_remaining: usize,
}

#[derive(Serialize)]
pub struct SeedResponse {
    success: bool,
    seeded: usize,
    message: String,
    items: Vec<GalleryItem>,
}

/// GET /gallery?category=<cat|all>
pub async fn list_items_handler(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, GalleryError> {
    let items = app_state
        .gallery
        .list_items(query.category.as_deref())
        .await?;

    Ok(Json(ListResponse {
        total: items.len(),
        items,
    }))
}

/// GET /gallery/{id}
pub async fn get_item_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, GalleryError> {
    let item = app_state.gallery.get_item(&id).await?;
    Ok(Json(ItemResponse { item }))
}

/// POST /gallery (multipart)
pub async fn upload_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, GalleryError> {
    require_admin(&headers, &app_state)?;

    let files = read_upload_form(multipart).await?;
    let summary = app_state.gallery.upload_batch(files).await?;

    Ok(Json(UploadResponse::from(summary)))
}

/// PATCH /gallery/{id}
pub async fn update_item_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<Json<ItemResponse>, GalleryError> {
    require_admin(&headers, &app_state)?;

    let updates = MetadataUpdate::try_from(payload)?;
    let item = app_state.gallery.update_metadata(&id, updates).await?;

    Ok(Json(ItemResponse { item }))
}

/// DELETE /gallery/{id}
pub async fn delete_item_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, GalleryError> {
    require_admin(&headers, &app_state)?;

    let outcome = app_state.gallery.delete_item(&id).await?;

    Ok(Json(DeleteResponse {
        success: true,
        total_remaining: outcome.total_remaining,
    }))
}

/// POST /gallery/seed
pub async fn seed_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<SeedResponse>), GalleryError> {
    require_admin(&headers, &app_state)?;

    let response = match app_state.gallery.seed_defaults().await? {
        SeedOutcome::Seeded(items) => (
            StatusCode::CREATED,
            Json(SeedResponse {
                success: true,
                seeded: items.len(),
                message: format!("Successfully seeded {} gallery items", items.len()),
                items,
            }),
        ),
        SeedOutcome::Skipped { existing } => (
            StatusCode::OK,
            Json(SeedResponse {
                success: false,
                seeded: 0,
                message: format!("Gallery already has {} items. Seed skipped.", existing),
                items: Vec::new(),
            }),
        ),
    };

    Ok(response)
}

/// Reads `files` parts plus the optional index-aligned `titles`,
/// `descriptions` and `categories` fields, and pairs each file with its own
/// metadata. A single `category` field applies to files without one.
async fn read_upload_form(mut multipart: Multipart) -> Result<Vec<UploadFile>, GalleryError> {
    let mut files = Vec::new();
    let mut titles = Vec::new();
    let mut descriptions = Vec::new();
    let mut categories = Vec::new();
    let mut shared_category = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                debug!(
                    "Received upload part '{}' ({} bytes, {:?})",
                    file_name,
                    bytes.len(),
                    content_type
                );
                files.push(UploadFile::new(file_name, content_type, bytes));
            }
            "titles" => titles.push(text_field(field).await?),
            "descriptions" => descriptions.push(text_field(field).await?),
            "categories" => categories.push(text_field(field).await?),
            "category" => shared_category = text_field(field).await?,
            other => debug!("Ignoring unexpected upload field '{}'", other),
        }
    }

    Ok(pair_metadata(
        files,
        titles,
        descriptions,
        categories,
        shared_category,
    ))
}

async fn text_field(field: Field<'_>) -> Result<Option<String>, GalleryError> {
    let text = field.text().await?;
    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn pair_metadata(
    files: Vec<UploadFile>,
    titles: Vec<Option<String>>,
    descriptions: Vec<Option<String>>,
    categories: Vec<Option<String>>,
    shared_category: Option<String>,
) -> Vec<UploadFile> {
    files
        .into_iter()
        .enumerate()
        .map(|(index, file)| {
            let metadata = UploadMetadata {
                title: titles.get(index).cloned().flatten(),
                description: descriptions.get(index).cloned().flatten(),
                category: categories
                    .get(index)
                    .cloned()
                    .flatten()
                    .or_else(|| shared_category.clone()),
            };
            file.with_metadata(metadata)
        })
        .collect()
}
