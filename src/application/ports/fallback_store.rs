use async_trait::async_trait;

use crate::domain::entities::{Comment, Post};
use crate::domain::value_objects::{PostId, UserId};
use crate::shared::error::AppError;

/// Per-client durable scratch space, written only when the gateway rejects an
/// operation because a relation is missing. Contents are merged into reads
/// for display and never transmitted back to the gateway.
#[async_trait]
pub trait FallbackStore: Send + Sync {
    /// Locally stored posts for a user, newest insertion first.
    async fn posts_for(&self, user_id: &UserId) -> Result<Vec<Post>, AppError>;

    async fn prepend_post(&self, post: Post) -> Result<(), AppError>;

    /// Idempotent membership toggle for the likes bucket. Returns whether the
    /// like exists after the call.
    async fn toggle_like(&self, post_id: &PostId, user_id: &UserId) -> Result<bool, AppError>;

    async fn likes_for(&self, post_id: &PostId) -> Result<Vec<UserId>, AppError>;

    async fn append_comment(&self, comment: Comment) -> Result<(), AppError>;

    async fn comments_for(&self, post_id: &PostId) -> Result<Vec<Comment>, AppError>;

    /// Cascading removal across all buckets when a post is deleted.
    async fn remove_post_records(&self, post_id: &PostId) -> Result<(), AppError>;
}
