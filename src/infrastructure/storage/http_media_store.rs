use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::media_store::MediaStore;
use crate::application::ports::post_gateway::GatewayError;
use crate::shared::config::StorageConfig;
use crate::shared::error::AppError;

/// Uploads post images to the remote object storage bucket.
pub struct HttpMediaStore {
    client: reqwest::Client,
    upload_url: String,
    bucket: String,
}

impl HttpMediaStore {
    pub fn new(config: &StorageConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            upload_url: config.upload_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/{}/{}", self.upload_url, self.bucket, path);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type.to_string())
            .body(bytes)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::unknown(format!(
                "upload failed with status {status}: {body}"
            )));
        }

        Ok(path.to_string())
    }
}
