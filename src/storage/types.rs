use axum::body::Bytes;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub bytes: Bytes,
    pub content_type: String,
    /// `<category>/<original file name>`; providers derive a unique key from it.
    pub suggested_name: String,
}

impl BlobUpload {
    pub fn new(
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
        suggested_name: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            suggested_name: suggested_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
    pub key: String,
}

/// Builds a collision-free object key from a suggested name.
///
/// The directory part of the suggestion is kept (restricted to
/// `[a-z0-9_-]` segments) and the file name is replaced with
/// `<unix millis>-<uuid>.<ext>`, so user-supplied names never reach the
/// storage namespace.
pub fn unique_object_key(suggested_name: &str) -> String {
    let (directory, file_name) = match suggested_name.rsplit_once('/') {
        Some((directory, file_name)) => (directory, file_name),
        None => ("", suggested_name),
    };

    let segments: Vec<String> = directory
        .split('/')
        .map(|segment| {
            segment
                .to_ascii_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .filter(|segment| !segment.is_empty())
        .collect();

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.to_ascii_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|ext| !ext.is_empty());

    let stem = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    );
    let leaf = match extension {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    };

    if segments.is_empty() {
        leaf
    } else {
        format!("{}/{}", segments.join("/"), leaf)
    }
}
