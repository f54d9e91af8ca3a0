//! Object-storage client for mirrored product images.
//!
//! Talks to a Supabase-style storage API: objects are uploaded to
//! `{url}/storage/v1/object/{bucket}/{key}` and served from
//! `{url}/storage/v1/object/public/{bucket}/{key}`.

use std::time::Duration;

use catmirror_core::AppConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage key is not a valid header value")]
    InvalidKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage upload of {object} failed with status {status}")]
    Status { object: String, status: u16 },
}

#[derive(Clone)]
pub struct StorageConfig {
    pub url: String,
    pub key: String,
    pub bucket: String,
    pub timeout_secs: u64,
}

impl StorageConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            url: config.storage_url.clone(),
            key: config.storage_key.clone(),
            bucket: config.storage_bucket.clone(),
            timeout_secs: config.source_request_timeout_secs,
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("key", &"[redacted]")
            .field("bucket", &self.bucket)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

pub struct StorageClient {
    client: Client,
    base_url: String,
    bucket: String,
}

impl StorageClient {
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the service key cannot be sent
    /// as a header, or [`StorageError::Http`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|_| StorageError::InvalidKey)?;
        bearer.set_sensitive(true);
        let mut apikey = HeaderValue::from_str(&config.key).map_err(|_| StorageError::InvalidKey)?;
        apikey.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("apikey", apikey);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
            bucket: config.bucket.clone(),
        })
    }

    /// Uploads `bytes` under `key`, overwriting any existing object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] on network failure or
    /// [`StorageError::Status`] for a non-2xx answer.
    pub async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/object/{}/{key}", self.base_url, self.bucket);
        let size = bytes.len();
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                object: format!("{}/{key}", self.bucket),
                status: status.as_u16(),
            });
        }

        tracing::debug!(bucket = %self.bucket, key, size, "storage: object uploaded");
        Ok(())
    }

    /// Public URL an uploaded object is served from.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{key}",
            self.base_url, self.bucket
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> StorageConfig {
        StorageConfig {
            url: url.to_owned(),
            key: "service-key".to_owned(),
            bucket: "images".to_owned(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn public_url_uses_public_path() {
        let client = StorageClient::new(&config("https://proj.supabase.co/")).expect("client");
        assert_eq!(
            client.public_url("p-1.jpg"),
            "https://proj.supabase.co/storage/v1/object/public/images/p-1.jpg"
        );
    }

    #[test]
    fn invalid_key_is_rejected() {
        let mut cfg = config("https://proj.supabase.co");
        cfg.key = "line\nbreak".to_owned();
        assert!(matches!(
            StorageClient::new(&cfg),
            Err(StorageError::InvalidKey)
        ));
    }

    #[test]
    fn debug_redacts_key() {
        assert!(!format!("{:?}", config("https://x")).contains("service-key"));
    }
}
