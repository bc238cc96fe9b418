use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    S3(S3Config),
    Local(LocalStorageConfig),
    /// Binaries are embedded in the record as `data:` URIs.
    Inline,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Local(LocalStorageConfig {
            directory: PathBuf::from("uploads"),
            url_prefix: default_url_prefix(),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Prepended to every object key, e.g. `gallery/`.
    #[serde(default)]
    pub key_prefix: Option<String>,
    /// Base URL used for `src` instead of the bucket's virtual-hosted URL,
    /// e.g. a CloudFront distribution.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default)]
    pub public_read: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalStorageConfig {
    pub directory: PathBuf,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

impl LocalStorageConfig {
    /// The prefix as mounted on the router: leading slash, no trailing slash.
    pub fn mount_path(&self) -> String {
        let trimmed = self.url_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            default_url_prefix()
        } else {
            format!("/{}", trimmed)
        }
    }
}

fn default_url_prefix() -> String {
    "/uploads".to_string()
}
