use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a post image lives: a path inside the remote storage bucket, or an
/// inline data URL produced when the storage upload failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource(String);

impl ImageSource {
    pub fn storage_path(path: String) -> Self {
        Self(path)
    }

    /// Inline fallback representation for image bytes.
    pub fn data_url(bytes: &[u8], content_type: &str) -> Self {
        Self(format!("data:{};base64,{}", content_type, STANDARD.encode(bytes)))
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_data_url(&self) -> bool {
        self.0.starts_with("data:")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ImageSource {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<ImageSource> for String {
    fn from(source: ImageSource) -> Self {
        source.0
    }
}
