use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use tracing::{debug, error};
use url::Url;

use crate::storage::{
    BlobStore, BlobUpload, S3Config, StorageError, StoredBlob, unique_object_key,
};

pub struct S3Store {
    client: Client,
    bucket: String,
    key_prefix: String,
    public_base_url: String,
    public_read: bool,
}

impl S3Store {
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        let bucket = config.bucket.trim().to_string();
        if bucket.is_empty() {
            return Err(StorageError::ConfigError(
                "S3 bucket name must not be empty".to_string(),
            ));
        }

        let mut aws_config_builder = aws_config::defaults(BehaviorVersion::latest());

        // Set region if provided, otherwise use default from environment
        if let Some(region) = &config.region {
            aws_config_builder = aws_config_builder.region(Region::new(region.clone()));
        }

        // If credentials are provided, use them. Otherwise, use the default provider chain
        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "hotel-gallery-s3-store",
            );
            aws_config_builder = aws_config_builder.credentials_provider(credentials);
        }

        let aws_config = aws_config_builder.load().await;

        let public_base_url = match &config.public_base_url {
            Some(base_url) => base_url.trim_end_matches('/').to_string(),
            None => {
                let region = aws_config.region().ok_or_else(|| {
                    StorageError::ConfigError(
                        "S3 region is not configured and none was found in the environment"
                            .to_string(),
                    )
                })?;
                format!("https://{}.s3.{}.amazonaws.com", bucket, region)
            }
        };
        Url::parse(&public_base_url).map_err(|e| {
            StorageError::ConfigError(format!(
                "Invalid public base URL '{}': {}",
                public_base_url, e
            ))
        })?;

        let key_prefix = config
            .key_prefix
            .as_deref()
            .map(|prefix| prefix.trim_matches('/'))
            .filter(|prefix| !prefix.is_empty())
            .map(|prefix| format!("{}/", prefix))
            .unwrap_or_default();

        let client = Client::new(&aws_config);

        Ok(Self {
            client,
            bucket,
            key_prefix,
            public_base_url,
            public_read: config.public_read,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn store(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError> {
        let key = format!(
            "{}{}",
            self.key_prefix,
            unique_object_key(&upload.suggested_name)
        );
        debug!(
            "Uploading {} bytes to s3://{}/{}",
            upload.bytes.len(),
            self.bucket,
            key
        );

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.bytes));

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        match request.send().await {
            Ok(_) => Ok(StoredBlob {
                url: self.object_url(&key),
                key,
            }),
            Err(e) => {
                error!("Failed to upload {} to S3: {}", key, e);
                Err(StorageError::ProviderError(e.to_string()))
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => {
                debug!("Deleted s3://{}/{}", self.bucket, key);
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete {} from S3: {}", key, e);
                Err(StorageError::ProviderError(e.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "Amazon S3"
    }
}
