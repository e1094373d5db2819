use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::application::ports::fallback_store::FallbackStore;
use crate::domain::entities::{Comment, Post};
use crate::domain::value_objects::{ImageSource, PostId, UserId};
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;

/// SQLite-backed fallback store. Rows are last-write-wins with no cross-tab
/// coordination; the store is private to this client.
pub struct SqliteFallbackStore {
    pool: ConnectionPool,
}

impl SqliteFallbackStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LocalPostRow {
    post_uuid: String,
    user_id: String,
    image_url: String,
    caption: String,
    created_at: String,
    likes_count: i64,
    comments_count: i64,
}

#[derive(Debug, FromRow)]
struct LocalCommentRow {
    id: String,
    post_uuid: String,
    user_id: String,
    body: String,
    created_at: String,
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl LocalPostRow {
    fn into_post(self) -> Result<Post, AppError> {
        Ok(Post {
            post_uuid: PostId::new(self.post_uuid).map_err(AppError::Database)?,
            user_id: UserId::new(self.user_id).map_err(AppError::Database)?,
            image_url: ImageSource::from(self.image_url),
            caption: self.caption,
            created_at: parse_timestamp(&self.created_at),
            likes_count: self.likes_count.max(0) as u32,
            comments_count: self.comments_count.max(0) as u32,
        })
    }
}

impl LocalCommentRow {
    fn into_comment(self) -> Result<Comment, AppError> {
        Ok(Comment {
            id: self.id,
            post_uuid: PostId::new(self.post_uuid).map_err(AppError::Database)?,
            user_id: UserId::new(self.user_id).map_err(AppError::Database)?,
            body: self.body,
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

#[async_trait]
impl FallbackStore for SqliteFallbackStore {
    async fn posts_for(&self, user_id: &UserId) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, LocalPostRow>(
            "SELECT post_uuid, user_id, image_url, caption, created_at, likes_count, comments_count
             FROM local_posts WHERE user_id = ?1 ORDER BY rowid DESC",
        )
        .bind(user_id.as_str())
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(LocalPostRow::into_post).collect()
    }

    async fn prepend_post(&self, post: Post) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR REPLACE INTO local_posts
             (post_uuid, user_id, image_url, caption, created_at, likes_count, comments_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(post.post_uuid.as_str())
        .bind(post.user_id.as_str())
        .bind(post.image_url.as_str())
        .bind(&post.caption)
        .bind(post.created_at.to_rfc3339())
        .bind(post.likes_count as i64)
        .bind(post.comments_count as i64)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn toggle_like(&self, post_id: &PostId, user_id: &UserId) -> Result<bool, AppError> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM local_likes WHERE post_uuid = ?1 AND user_id = ?2")
                .bind(post_id.as_str())
                .bind(user_id.as_str())
                .fetch_optional(self.pool.get_pool())
                .await?;

        if existing.is_some() {
            sqlx::query("DELETE FROM local_likes WHERE post_uuid = ?1 AND user_id = ?2")
                .bind(post_id.as_str())
                .bind(user_id.as_str())
                .execute(self.pool.get_pool())
                .await?;
            Ok(false)
        } else {
            sqlx::query("INSERT INTO local_likes (post_uuid, user_id) VALUES (?1, ?2)")
                .bind(post_id.as_str())
                .bind(user_id.as_str())
                .execute(self.pool.get_pool())
                .await?;
            Ok(true)
        }
    }

    async fn likes_for(&self, post_id: &PostId) -> Result<Vec<UserId>, AppError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT user_id FROM local_likes WHERE post_uuid = ?1")
                .bind(post_id.as_str())
                .fetch_all(self.pool.get_pool())
                .await?;

        rows.into_iter()
            .map(|(id,)| UserId::new(id).map_err(AppError::Database))
            .collect()
    }

    async fn append_comment(&self, comment: Comment) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR REPLACE INTO local_comments (id, post_uuid, user_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&comment.id)
        .bind(comment.post_uuid.as_str())
        .bind(comment.user_id.as_str())
        .bind(&comment.body)
        .bind(comment.created_at.to_rfc3339())
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn comments_for(&self, post_id: &PostId) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, LocalCommentRow>(
            "SELECT id, post_uuid, user_id, body, created_at
             FROM local_comments WHERE post_uuid = ?1 ORDER BY rowid ASC",
        )
        .bind(post_id.as_str())
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(LocalCommentRow::into_comment).collect()
    }

    async fn remove_post_records(&self, post_id: &PostId) -> Result<(), AppError> {
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query("DELETE FROM local_posts WHERE post_uuid = ?1")
            .bind(post_id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM local_likes WHERE post_uuid = ?1")
            .bind(post_id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM local_comments WHERE post_uuid = ?1")
            .bind(post_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ImageSource;

    async fn setup_store() -> SqliteFallbackStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        SqliteFallbackStore::new(pool)
    }

    fn sample_post(id: &str, user: &str) -> Post {
        Post::new(
            PostId::new(id.to_string()).unwrap(),
            UserId::new(user.to_string()).unwrap(),
            ImageSource::storage_path(format!("posts/{user}/{id}.png")),
            "Sunset".to_string(),
        )
    }

    #[tokio::test]
    async fn posts_are_returned_newest_insertion_first() {
        let store = setup_store().await;
        let user = UserId::new("u1".to_string()).unwrap();

        store.prepend_post(sample_post("p1", "u1")).await.unwrap();
        store.prepend_post(sample_post("p2", "u1")).await.unwrap();
        store.prepend_post(sample_post("p3", "u2")).await.unwrap();

        let posts = store.posts_for(&user).await.unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.post_uuid.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[tokio::test]
    async fn toggle_like_is_idempotent_per_pair() {
        let store = setup_store().await;
        let post = PostId::new("p1".to_string()).unwrap();
        let user = UserId::new("u1".to_string()).unwrap();

        assert!(store.toggle_like(&post, &user).await.unwrap());
        assert_eq!(store.likes_for(&post).await.unwrap().len(), 1);

        assert!(!store.toggle_like(&post, &user).await.unwrap());
        assert!(store.likes_for(&post).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn comments_keep_append_order() {
        let store = setup_store().await;
        let post = PostId::new("p1".to_string()).unwrap();
        let user = UserId::new("u1".to_string()).unwrap();

        let first = Comment::local(post.clone(), user.clone(), "first".to_string());
        let second = Comment {
            id: "c2".to_string(),
            ..Comment::local(post.clone(), user.clone(), "second".to_string())
        };
        store.append_comment(first).await.unwrap();
        store.append_comment(second).await.unwrap();

        let comments = store.comments_for(&post).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].body, "first");
        assert_eq!(comments[1].body, "second");
    }

    #[tokio::test]
    async fn remove_post_records_cascades_across_buckets() {
        let store = setup_store().await;
        let post = PostId::new("p1".to_string()).unwrap();
        let user = UserId::new("u1".to_string()).unwrap();

        store.prepend_post(sample_post("p1", "u1")).await.unwrap();
        store.toggle_like(&post, &user).await.unwrap();
        store
            .append_comment(Comment::local(post.clone(), user.clone(), "hi".to_string()))
            .await
            .unwrap();

        store.remove_post_records(&post).await.unwrap();

        assert!(store.posts_for(&user).await.unwrap().is_empty());
        assert!(store.likes_for(&post).await.unwrap().is_empty());
        assert!(store.comments_for(&post).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn posts_survive_a_pool_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}/fallback.db", dir.path().display());
        let user = UserId::new("u1".to_string()).unwrap();

        {
            let pool = ConnectionPool::new(&url, 1).await.unwrap();
            pool.migrate().await.unwrap();
            let store = SqliteFallbackStore::new(pool.clone());
            store.prepend_post(sample_post("p1", "u1")).await.unwrap();
            pool.close().await;
        }

        let pool = ConnectionPool::new(&url, 1).await.unwrap();
        pool.migrate().await.unwrap();
        let store = SqliteFallbackStore::new(pool);

        let posts = store.posts_for(&user).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].caption, "Sunset");
    }
}
