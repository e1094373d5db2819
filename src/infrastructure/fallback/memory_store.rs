use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::application::ports::fallback_store::FallbackStore;
use crate::domain::entities::{Comment, Post};
use crate::domain::value_objects::{PostId, UserId};
use crate::shared::error::AppError;

/// In-memory fallback store for tests and ephemeral sessions that should not
/// persist local drafts across restarts.
#[derive(Default)]
pub struct MemoryFallbackStore {
    posts: RwLock<Vec<Post>>,
    likes: RwLock<HashMap<PostId, Vec<UserId>>>,
    comments: RwLock<HashMap<PostId, Vec<Comment>>>,
}

impl MemoryFallbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FallbackStore for MemoryFallbackStore {
    async fn posts_for(&self, user_id: &UserId) -> Result<Vec<Post>, AppError> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn prepend_post(&self, post: Post) -> Result<(), AppError> {
        let mut posts = self.posts.write().await;
        posts.retain(|p| p.post_uuid != post.post_uuid);
        posts.insert(0, post);
        Ok(())
    }

    async fn toggle_like(&self, post_id: &PostId, user_id: &UserId) -> Result<bool, AppError> {
        let mut likes = self.likes.write().await;
        let bucket = likes.entry(post_id.clone()).or_default();
        if let Some(index) = bucket.iter().position(|id| id == user_id) {
            bucket.remove(index);
            Ok(false)
        } else {
            bucket.push(user_id.clone());
            Ok(true)
        }
    }

    async fn likes_for(&self, post_id: &PostId) -> Result<Vec<UserId>, AppError> {
        let likes = self.likes.read().await;
        Ok(likes.get(post_id).cloned().unwrap_or_default())
    }

    async fn append_comment(&self, comment: Comment) -> Result<(), AppError> {
        let mut comments = self.comments.write().await;
        comments
            .entry(comment.post_uuid.clone())
            .or_default()
            .push(comment);
        Ok(())
    }

    async fn comments_for(&self, post_id: &PostId) -> Result<Vec<Comment>, AppError> {
        let comments = self.comments.read().await;
        Ok(comments.get(post_id).cloned().unwrap_or_default())
    }

    async fn remove_post_records(&self, post_id: &PostId) -> Result<(), AppError> {
        self.posts.write().await.retain(|p| &p.post_uuid != post_id);
        self.likes.write().await.remove(post_id);
        self.comments.write().await.remove(post_id);
        Ok(())
    }
}
