//! Object storage for uploaded images
//!
//! The hosted storage service exposes an S3-compatible endpoint, so uploads go
//! through `aws-sdk-s3` with path-style addressing. Objects are served from the
//! service's public bucket URL.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::{Client, primitives::ByteStream};
use bytes::Bytes;
use tracing::{error, info};

use crate::error::{MediaError, MediaResult};

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding listing images (default: `item-images`)
    pub bucket: String,
    pub region: String,
    /// S3-compatible endpoint, e.g. `{SUPABASE_URL}/storage/v1/s3`
    pub endpoint: String,
    /// Prefix of public object URLs, e.g. `{SUPABASE_URL}/storage/v1/object/public`
    pub public_base_url: String,
    /// Static credentials; the default AWS provider chain is used when absent
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Upload timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl StorageConfig {
    /// Derive endpoints from the hosted project URL
    pub fn for_project(project_url: &str) -> Self {
        let base = project_url.trim_end_matches('/');
        Self {
            bucket: "item-images".to_string(),
            region: "us-east-1".to_string(),
            endpoint: format!("{}/storage/v1/s3", base),
            public_base_url: format!("{}/storage/v1/object/public", base),
            access_key_id: None,
            secret_access_key: None,
            timeout_secs: 30,
        }
    }

    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            self.bucket,
            name
        )
    }
}

/// Somewhere to put image bytes
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `name` and return the public URL
    async fn put(&self, name: &str, bytes: Bytes, content_type: &str) -> MediaResult<String>;
}

/// S3-compatible object store
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    config: StorageConfig,
}

impl S3ObjectStore {
    pub async fn connect(config: StorageConfig) -> MediaResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint);

        match (&config.access_key_id, &config.secret_access_key) {
            (Some(id), Some(secret)) => {
                loader = loader.credentials_provider(Credentials::new(
                    id.clone(),
                    secret.clone(),
                    None,
                    None,
                    "pesxchange-static",
                ));
            }
            (None, None) => {}
            _ => {
                return Err(MediaError::Configuration(
                    "both access key id and secret access key must be set".to_string(),
                ));
            }
        }

        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        info!(
            "Object storage configured for bucket {} at {}",
            config.bucket, config.endpoint
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            config,
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, name: &str, bytes: Bytes, content_type: &str) -> MediaResult<String> {
        info!("Uploading {} ({} bytes, {})", name, bytes.len(), content_type);

        let request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(name)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send();

        match tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), request).await {
            Ok(Ok(_)) => Ok(self.config.public_url(name)),
            Ok(Err(e)) => {
                error!("Failed to upload {}: {}", name, DisplayErrorContext(&e));
                Err(MediaError::Storage(e.to_string()))
            }
            Err(_) => {
                error!("Upload of {} timed out", name);
                Err(MediaError::Storage("upload timed out".to_string()))
            }
        }
    }
}
