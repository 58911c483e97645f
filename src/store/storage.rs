//! Supabase Storage client for listing images and company logos

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;

/// Bucket holding listing photos
pub const PRODUCT_IMAGES_BUCKET: &str = "product_images";
/// Bucket holding company logos
pub const AVATARS_BUCKET: &str = "avatars";

#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    service_role_key: String,
}

impl StorageClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    fn public_prefix(&self, bucket: &str) -> String {
        format!("{}/storage/v1/object/public/{}/", self.base_url, bucket)
    }

    /// Public URL of an object
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}{}", self.public_prefix(bucket), path)
    }

    /// Object path inside `bucket` for a public URL issued by this project.
    /// Placeholder ids and foreign URLs give `None`.
    pub fn object_path(&self, bucket: &str, public_url: &str) -> Option<String> {
        public_url
            .strip_prefix(&self.public_prefix(bucket))
            .filter(|path| !path.is_empty())
            .map(str::to_string)
    }

    /// Upload an object and return its public URL
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        debug!(bucket, path, size = body.len(), "uploading object");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(self.public_url(bucket, path))
    }

    /// Delete objects
    pub async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, bucket);

        let response = self
            .client
            .delete(&url)
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .json(&serde_json::json!({ "prefixes": paths }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Remove the object behind `public_url` if it lives in `bucket`.
    /// Failures are logged and swallowed.
    pub async fn remove_by_url(&self, bucket: &str, public_url: &str) {
        let Some(path) = self.object_path(bucket, public_url) else {
            return;
        };
        if let Err(e) = self.remove(bucket, &[path.clone()]).await {
            warn!(bucket, path = %path, error = %e, "failed to remove stored object");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Storage API error (status {status}): {body}")]
    Api { status: u16, body: String },
}
