use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::entities::{Comment, Post};
use crate::domain::value_objects::{ImageSource, PostId, UserId};

/// Structured classification of a gateway failure. Produced once, at the
/// adapter boundary, so services never have to inspect raw error strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Unauthorized,
    MissingField,
    Forbidden,
    NotFound,
    /// The gateway rejected the operation because the backing relation does
    /// not exist. Recoverable via the local fallback store.
    SchemaMissing,
    Network,
    Unknown,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GatewayErrorKind::Unauthorized => "unauthorized",
            GatewayErrorKind::MissingField => "missing_field",
            GatewayErrorKind::Forbidden => "forbidden",
            GatewayErrorKind::NotFound => "not_found",
            GatewayErrorKind::SchemaMissing => "schema_missing",
            GatewayErrorKind::Network => "network",
            GatewayErrorKind::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Error)]
#[error("gateway error ({kind}): {detail}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub detail: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, detail)
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unknown, detail)
    }

    pub fn is_schema_missing(&self) -> bool {
        self.kind == GatewayErrorKind::SchemaMissing
    }
}

/// Image adjustments captured by the post editor. Sent alongside the create
/// request; the adapter drops them when the gateway's schema lacks the column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostFilters {
    pub brightness: f32,
    pub contrast: f32,
    pub blur: f32,
    pub zoom: f32,
}

impl Default for PostFilters {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            blur: 0.0,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPostRequest {
    pub user_id: UserId,
    pub caption: String,
    pub image_url: ImageSource,
    pub filters: Option<PostFilters>,
}

#[derive(Debug, Clone)]
pub struct CreatedPost {
    pub post: Post,
    pub used_fallback_user_id: bool,
}

#[derive(Debug, Clone)]
pub struct LikeAck {
    pub liked: bool,
    pub likes_count: u32,
}

#[derive(Debug, Clone)]
pub struct CommentAck {
    pub comment: Comment,
    pub comments_count: u32,
}

/// Boundary to the remote data gateway. Implementations classify failures
/// into [`GatewayError`] kinds; the debug operations must only be reachable
/// when the runtime capabilities enable them.
#[async_trait]
pub trait PostGateway: Send + Sync {
    async fn create_post(&self, request: NewPostRequest) -> Result<CreatedPost, GatewayError>;

    async fn toggle_like(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<LikeAck, GatewayError>;

    async fn add_comment(
        &self,
        post_id: &PostId,
        user_id: &UserId,
        body: &str,
    ) -> Result<CommentAck, GatewayError>;

    async fn fetch_comments(&self, post_id: &PostId) -> Result<Vec<Comment>, GatewayError>;

    async fn delete_post(&self, post_id: &PostId, user_id: &UserId) -> Result<(), GatewayError>;

    /// Existence probe used to reclassify failed deletes whose row is
    /// already gone.
    async fn post_exists(&self, post_id: &PostId) -> Result<bool, GatewayError>;

    async fn fetch_posts(&self, user_id: &UserId, limit: u32) -> Result<Vec<Post>, GatewayError>;

    /// Privileged read bypassing row-level checks. Development only.
    async fn debug_fetch_posts(&self, user_id: &UserId) -> Result<Vec<Post>, GatewayError>;

    /// Privileged delete bypassing row-level checks. Development only.
    async fn debug_delete_post(&self, post_id: &PostId) -> Result<(), GatewayError>;
}
