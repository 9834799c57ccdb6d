use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::core::config::AppConfig;
use crate::errors::RelayError;

/// Object store holding the generated audio files.
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Uploads the file at `path` under `key`.
    async fn upload(&self, path: &Path, key: &str, content_type: &str) -> Result<(), RelayError>;

    /// Public URL a device can fetch `key` from.
    fn public_url(&self, key: &str) -> String;
}

/// Static-website URL of an object: `http://<bucket>.s3-website-<region>.amazonaws.com/<key>`.
#[must_use]
pub fn website_url(bucket: &str, region: &str, key: &str) -> String {
    format!("http://{bucket}.s3-website-{region}.amazonaws.com/{key}")
}

pub struct S3AudioStore {
    client: S3Client,
    bucket: String,
    region: String,
}

impl S3AudioStore {
    #[must_use]
    pub fn new(client: S3Client, bucket: String, region: String) -> Self {
        Self {
            client,
            bucket,
            region,
        }
    }

    /// Loads AWS credentials from the Lambda environment, pinned to the
    /// configured region.
    pub async fn from_config(config: &AppConfig) -> Self {
        #[allow(deprecated)]
        let shared = aws_config::from_env()
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;
        Self::new(
            S3Client::new(&shared),
            config.bucket_name.clone(),
            config.aws_region.clone(),
        )
    }
}

#[async_trait]
impl AudioStore for S3AudioStore {
    async fn upload(&self, path: &Path, key: &str, content_type: &str) -> Result<(), RelayError> {
        let body = ByteStream::from_path(path).await.map_err(|e| {
            RelayError::IoError(format!("read {} for upload: {e}", path.display()))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                RelayError::AwsError(format!("s3 put_object: {}", DisplayErrorContext(&e)))
            })?;

        info!(bucket = %self.bucket, key = %key, content_type = %content_type, "Uploaded audio");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        website_url(&self.bucket, &self.region, key)
    }
}
