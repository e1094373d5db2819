use async_trait::async_trait;

use crate::application::ports::post_gateway::GatewayError;

/// Remote object storage for post images. Upload failures are tolerated by
/// the coordinator, which falls back to an inline data URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads the bytes and returns the stored object path.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError>;
}
