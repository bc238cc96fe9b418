use super::GalleryError;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Query value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.to_ascii_lowercase().starts_with("video/") {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Rooms,
    Events,
    Dining,
    Amenities,
    #[default]
    Uploaded,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Rooms,
        Category::Events,
        Category::Dining,
        Category::Amenities,
        Category::Uploaded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Rooms => "rooms",
            Category::Events => "events",
            Category::Dining => "dining",
            Category::Amenities => "amenities",
            Category::Uploaded => "uploaded",
        }
    }

    /// Upload-time category resolution: anything missing or unknown lands in
    /// `uploaded`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Category {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| GalleryError::Validation(format!("unknown category '{}'", s)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub src: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    /// `None` marks a seed item with no blob behind it.
    #[serde(default)]
    pub storage_key: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub mime_type: String,
}

impl GalleryItem {
    pub fn is_seed(&self) -> bool {
        self.storage_key.is_none()
    }
}

/// A record ready for insertion; the repository assigns `id` and
/// `uploaded_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGalleryItem {
    pub media_type: MediaType,
    pub src: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub storage_key: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
}

impl NewGalleryItem {
    pub(crate) fn into_item(self, id: String, uploaded_at: DateTime<Utc>) -> GalleryItem {
        GalleryItem {
            id,
            media_type: self.media_type,
            src: self.src,
            title: self.title,
            description: self.description,
            category: self.category,
            storage_key: self.storage_key,
            uploaded_at,
            updated_at: None,
            file_name: self.file_name,
            file_size: self.file_size,
            mime_type: self.mime_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFilter {
    All,
    Category(Category),
}

impl ItemFilter {
    pub fn matches(&self, item: &GalleryItem) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Category(category) => item.category == *category,
        }
    }
}

/// Partial edit of the user-editable fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
}

impl MetadataUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.category.is_none()
    }

    pub(crate) fn apply(self, item: &mut GalleryItem, updated_at: DateTime<Utc>) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        item.updated_at = Some(updated_at);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl TryFrom<UpdateItemPayload> for MetadataUpdate {
    type Error = GalleryError;

    fn try_from(payload: UpdateItemPayload) -> Result<Self, Self::Error> {
        let category = payload
            .category
            .as_deref()
            .map(|value| value.trim().parse::<Category>())
            .transpose()?;

        Ok(MetadataUpdate {
            title: payload.title,
            description: payload.description,
            category,
        })
    }
}

/// Caller-supplied metadata for one uploaded file; every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
    pub metadata: UploadMetadata,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes: bytes.into(),
            metadata: UploadMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: UploadMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata.category = Some(category.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    /// Position of the file in the submitted batch.
    pub index: usize,
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub items: Vec<GalleryItem>,
    pub failures: Vec<FileFailure>,
}

impl UploadSummary {
    pub fn created_count(&self) -> usize {
        self.items.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub item: GalleryItem,
    pub total_remaining: usize,
}

#[derive(Debug, Clone)]
pub enum SeedOutcome {
    Seeded(Vec<GalleryItem>),
    Skipped { existing: usize },
}
