use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::Post;
use crate::domain::value_objects::PostId;

/// The in-memory post list a mounted view renders. Single-writer: only the
/// sync coordinator and the feed service mutate it; render code reads
/// snapshots.
#[derive(Clone, Default)]
pub struct PostListHandle {
    inner: Arc<RwLock<Vec<Post>>>,
}

impl PostListHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<Post> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn contains(&self, post_id: &PostId) -> bool {
        self.inner
            .read()
            .await
            .iter()
            .any(|p| &p.post_uuid == post_id)
    }

    pub async fn replace(&self, posts: Vec<Post>) {
        *self.inner.write().await = posts;
    }

    /// Prepends unless the id is already present, so duplicate event
    /// deliveries cannot double-insert. Returns whether the list changed.
    pub async fn prepend_unique(&self, post: Post) -> bool {
        let mut posts = self.inner.write().await;
        if posts.iter().any(|p| p.post_uuid == post.post_uuid) {
            return false;
        }
        posts.insert(0, post);
        true
    }

    pub async fn remove(&self, post_id: &PostId) {
        self.inner.write().await.retain(|p| &p.post_uuid != post_id);
    }

    pub async fn set_likes(&self, post_id: &PostId, likes_count: u32) {
        let mut posts = self.inner.write().await;
        if let Some(post) = posts.iter_mut().find(|p| &p.post_uuid == post_id) {
            post.likes_count = likes_count;
        }
    }

    /// Applies a local like toggle to the displayed counter, flooring at
    /// zero. Returns the new counter when the post is in the list.
    pub async fn adjust_likes(&self, post_id: &PostId, liked: bool) -> Option<u32> {
        let mut posts = self.inner.write().await;
        let post = posts.iter_mut().find(|p| &p.post_uuid == post_id)?;
        if liked {
            post.increment_likes();
        } else {
            post.decrement_likes();
        }
        Some(post.likes_count)
    }

    pub async fn set_comments(&self, post_id: &PostId, comments_count: u32) {
        let mut posts = self.inner.write().await;
        if let Some(post) = posts.iter_mut().find(|p| &p.post_uuid == post_id) {
            post.comments_count = comments_count;
        }
    }

    pub async fn increment_comments(&self, post_id: &PostId) -> Option<u32> {
        let mut posts = self.inner.write().await;
        let post = posts.iter_mut().find(|p| &p.post_uuid == post_id)?;
        post.increment_comments();
        Some(post.comments_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ImageSource, UserId};

    fn post(id: &str) -> Post {
        Post::new(
            PostId::new(id.to_string()).unwrap(),
            UserId::new("u1".to_string()).unwrap(),
            ImageSource::storage_path(format!("posts/u1/{id}.png")),
            "caption".to_string(),
        )
    }

    #[tokio::test]
    async fn prepend_unique_rejects_duplicates() {
        let list = PostListHandle::new();
        assert!(list.prepend_unique(post("p1")).await);
        assert!(!list.prepend_unique(post("p1")).await);
        assert_eq!(list.len().await, 1);
    }

    #[tokio::test]
    async fn adjust_likes_floors_at_zero() {
        let list = PostListHandle::new();
        list.prepend_unique(post("p1")).await;
        let id = PostId::new("p1".to_string()).unwrap();

        assert_eq!(list.adjust_likes(&id, false).await, Some(0));
        assert_eq!(list.adjust_likes(&id, true).await, Some(1));
        assert_eq!(list.adjust_likes(&id, false).await, Some(0));
    }

    #[tokio::test]
    async fn adjust_likes_misses_unknown_posts() {
        let list = PostListHandle::new();
        let id = PostId::new("nope".to_string()).unwrap();
        assert_eq!(list.adjust_likes(&id, true).await, None);
    }
}
