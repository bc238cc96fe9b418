use crate::{
    Config, DEFAULT_ADMIN_PASSWORD, DEFAULT_SESSION_SECRET, repository::DatabaseConfig,
    storage::StorageConfig,
};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create storage directory: {0}")]
    StorageDirectoryCreationFailed(std::io::Error),

    #[error("Failed to create database directory: {0}")]
    DatabaseDirectoryCreationFailed(std::io::Error),

    #[error("S3 storage is misconfigured: {0}")]
    S3Misconfigured(String),

    #[error("Admin password is still the default")]
    DefaultAdminPassword,

    #[error("Session secret is still the default")]
    DefaultSessionSecret,
}

impl StartupCheckError {
    /// Critical failures stop the server; the rest are logged and ignored.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::StorageDirectoryCreationFailed(_)
                | StartupCheckError::DatabaseDirectoryCreationFailed(_)
                | StartupCheckError::S3Misconfigured(_)
        )
    }
}

async fn ensure_directory(dir: &Path, label: &str) -> Result<(), std::io::Error> {
    if dir.exists() {
        info!("{} directory exists: {:?}", label, dir);
        return Ok(());
    }

    info!("{} directory does not exist, creating: {:?}", label, dir);
    tokio::fs::create_dir_all(dir).await.inspect_err(|e| {
        error!("Failed to create {} directory {:?}: {}", label, dir, e);
    })?;
    info!("{} directory created successfully", label);
    Ok(())
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    match &config.storage {
        StorageConfig::Local(local_config) => {
            if let Err(e) = ensure_directory(&local_config.directory, "Storage").await {
                errors.push(StartupCheckError::StorageDirectoryCreationFailed(e));
            }
        }
        StorageConfig::S3(s3_config) => {
            if s3_config.bucket.trim().is_empty() {
                error!("S3 storage selected but no bucket configured");
                errors.push(StartupCheckError::S3Misconfigured(
                    "bucket must not be empty".to_string(),
                ));
            }
            if s3_config.access_key_id.is_some() != s3_config.secret_access_key.is_some() {
                error!("S3 access key id and secret access key must be set together");
                errors.push(StartupCheckError::S3Misconfigured(
                    "incomplete static credentials".to_string(),
                ));
            }
        }
        StorageConfig::Inline => {
            warn!("Inline storage embeds every upload in the database document");
        }
    }

    if let DatabaseConfig::Json(json_config) = &config.database
        && let Some(parent) = json_config.path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = ensure_directory(parent, "Database").await
    {
        errors.push(StartupCheckError::DatabaseDirectoryCreationFailed(e));
    }

    if config.app.admin_password == DEFAULT_ADMIN_PASSWORD {
        warn!("Admin password is the built-in default; set app.admin_password");
        errors.push(StartupCheckError::DefaultAdminPassword);
    }
    if config.app.session_secret == DEFAULT_SESSION_SECRET {
        warn!("Session secret is the built-in default; set app.session_secret");
        errors.push(StartupCheckError::DefaultSessionSecret);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
