//! Storage module - blob storage for issue attachments
//!
//! Images and voice notes are written either to an S3-compatible bucket
//! (AWS, MinIO, R2) or to a directory on the local filesystem. Both backends
//! implement the application's [`BlobStorage`] port and hand back the URL the
//! issue record keeps.

use async_trait::async_trait;
use aws_sdk_s3::{config::Region, primitives::ByteStream, Client};
use bytes::Bytes;
use civic_issues_application::BlobStorage;
use civic_issues_common::StorageConfig;
use civic_issues_domain::errors::IntegrationError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{Error, Result};

/// URL prefix for local uploads when no public base URL is configured
const DEFAULT_LOCAL_BASE_URL: &str = "/uploads";

/// Object key for an upload: `{folder}/{uuid}-{file name}`
pub fn object_key(folder: &str, file_name: &str) -> String {
    let name: String = file_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = if name.is_empty() { "upload".to_string() } else { name };
    format!("{}/{}-{}", folder.trim_matches('/'), Uuid::now_v7(), name)
}

fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Storage health status.
#[derive(Debug, Clone)]
pub struct StorageHealthStatus {
    /// Whether storage is reachable
    pub healthy: bool,
    /// Probe latency
    pub latency: Duration,
    /// Error message if unhealthy
    pub error: Option<String>,
}

/// S3-compatible storage implementation.
pub struct S3BlobStorage {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    public_base_url: Option<String>,
}

impl S3BlobStorage {
    /// Create a new S3 storage instance using the ambient AWS credential chain.
    #[instrument(skip(config))]
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(Error::Configuration("storage.bucket not set".to_string()));
        }
        info!(bucket = %config.bucket, region = %config.region, "Initializing S3 storage");

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        // S3-compatible services are addressed path-style
        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::from_client(Client::from_conf(builder.build()), config))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Public URL of a stored object.
    pub fn object_url(&self, key: &str) -> String {
        match (&self.public_base_url, &self.endpoint) {
            (Some(base), _) => join_url(base, key),
            (None, Some(endpoint)) => join_url(&join_url(endpoint, &self.bucket), key),
            (None, None) => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }

    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(())
    }

    /// Check storage health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> StorageHealthStatus {
        let start = std::time::Instant::now();

        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                let latency = start.elapsed();
                debug!(latency_ms = latency.as_millis(), "Storage health check passed");
                StorageHealthStatus {
                    healthy: true,
                    latency,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Storage health check failed");
                StorageHealthStatus {
                    healthy: false,
                    latency: start.elapsed(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[async_trait]
impl BlobStorage for S3BlobStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn store(
        &self,
        bytes: Bytes,
        folder: &str,
        file_name: &str,
        content_type: &str,
    ) -> std::result::Result<String, IntegrationError> {
        let key = object_key(folder, file_name);
        self.put(&key, bytes, content_type).await.map_err(|e| {
            warn!(key = %key, error = %e, "Upload failed");
            IntegrationError::UploadFailed(e.to_string())
        })?;

        debug!(key = %key, "Object uploaded");
        Ok(self.object_url(&key))
    }
}

/// Filesystem storage for development deployments.
pub struct LocalBlobStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStorage {
    /// Store files under `config.local_root`.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.local_root),
            public_base_url: config
                .public_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCAL_BASE_URL.to_string()),
        }
    }

    /// Filesystem root of the stored files.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Storage(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn store(
        &self,
        bytes: Bytes,
        folder: &str,
        file_name: &str,
        _content_type: &str,
    ) -> std::result::Result<String, IntegrationError> {
        let key = object_key(folder, file_name);
        self.write(&key, &bytes)
            .await
            .map_err(|e| IntegrationError::UploadFailed(e.to_string()))?;

        debug!(key = %key, root = %self.root.display(), "File stored");
        Ok(join_url(&self.public_base_url, &key))
    }
}
