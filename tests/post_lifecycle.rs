use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use artistry_client::application::ports::post_gateway::{
    CommentAck, CreatedPost, GatewayError, GatewayErrorKind, LikeAck, NewPostRequest,
};
use artistry_client::application::services::{FeedService, NewPostImage, PostSyncService};
use artistry_client::infrastructure::event::PostEventBus;
use artistry_client::infrastructure::fallback::MemoryFallbackStore;
use artistry_client::shared::RuntimeCapabilities;
use artistry_client::{Comment, ImageSource, MediaStore, Post, PostGateway, PostId, PostListHandle, UserId};

/// Gateway double backed by in-memory tables. The likes and comments
/// relations can be marked missing to drive the local fallback paths.
struct StubGateway {
    posts: Mutex<Vec<Post>>,
    likes: Mutex<HashMap<String, u32>>,
    create_fails: bool,
    relations_missing: bool,
}

impl StubGateway {
    fn working() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            likes: Mutex::new(HashMap::new()),
            create_fails: false,
            relations_missing: false,
        }
    }

    fn degraded() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            likes: Mutex::new(HashMap::new()),
            create_fails: true,
            relations_missing: true,
        }
    }

    fn missing_relation(name: &str) -> GatewayError {
        GatewayError::new(
            GatewayErrorKind::SchemaMissing,
            format!("Could not find the table 'public.{name}'"),
        )
    }
}

#[async_trait]
impl PostGateway for StubGateway {
    async fn create_post(&self, request: NewPostRequest) -> Result<CreatedPost, GatewayError> {
        if self.create_fails {
            return Err(GatewayError::unknown("insert rejected"));
        }
        let post = Post::new(
            PostId::new(format!("srv-{}", self.posts.lock().await.len() + 1))
                .map_err(GatewayError::unknown)?,
            request.user_id,
            request.image_url,
            request.caption,
        );
        self.posts.lock().await.insert(0, post.clone());
        Ok(CreatedPost {
            post,
            used_fallback_user_id: false,
        })
    }

    async fn toggle_like(
        &self,
        post_id: &PostId,
        _user_id: &UserId,
    ) -> Result<LikeAck, GatewayError> {
        if self.relations_missing {
            return Err(Self::missing_relation("post_likes"));
        }
        let mut likes = self.likes.lock().await;
        let count = likes.entry(post_id.as_str().to_string()).or_insert(0);
        *count += 1;
        Ok(LikeAck {
            liked: true,
            likes_count: *count,
        })
    }

    async fn add_comment(
        &self,
        post_id: &PostId,
        user_id: &UserId,
        body: &str,
    ) -> Result<CommentAck, GatewayError> {
        if self.relations_missing {
            return Err(Self::missing_relation("post_comments"));
        }
        Ok(CommentAck {
            comment: Comment::local(post_id.clone(), user_id.clone(), body.to_string()),
            comments_count: 1,
        })
    }

    async fn fetch_comments(&self, _post_id: &PostId) -> Result<Vec<Comment>, GatewayError> {
        if self.relations_missing {
            return Err(Self::missing_relation("post_comments"));
        }
        Ok(Vec::new())
    }

    async fn delete_post(&self, post_id: &PostId, _user_id: &UserId) -> Result<(), GatewayError> {
        self.posts
            .lock()
            .await
            .retain(|post| &post.post_uuid != post_id);
        Ok(())
    }

    async fn post_exists(&self, post_id: &PostId) -> Result<bool, GatewayError> {
        Ok(self
            .posts
            .lock()
            .await
            .iter()
            .any(|post| &post.post_uuid == post_id))
    }

    async fn fetch_posts(&self, user_id: &UserId, limit: u32) -> Result<Vec<Post>, GatewayError> {
        Ok(self
            .posts
            .lock()
            .await
            .iter()
            .filter(|post| &post.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn debug_fetch_posts(&self, _user_id: &UserId) -> Result<Vec<Post>, GatewayError> {
        Ok(Vec::new())
    }

    async fn debug_delete_post(&self, _post_id: &PostId) -> Result<(), GatewayError> {
        Err(GatewayError::unknown("debug endpoint disabled"))
    }
}

struct NullMediaStore;

#[async_trait]
impl MediaStore for NullMediaStore {
    async fn upload(
        &self,
        path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, GatewayError> {
        Ok(path.to_string())
    }
}

fn wire(gateway: StubGateway) -> (PostSyncService, FeedService) {
    let gateway: Arc<StubGateway> = Arc::new(gateway);
    let fallback = Arc::new(MemoryFallbackStore::new());
    let posts = PostListHandle::new();
    let bus = PostEventBus::new();
    let capabilities = RuntimeCapabilities::default();
    let sync = PostSyncService::new(
        gateway.clone(),
        fallback.clone(),
        Arc::new(NullMediaStore),
        bus,
        posts.clone(),
        capabilities.clone(),
    );
    let feed = FeedService::new(
        gateway,
        fallback,
        posts,
        UserId::new("artist-1".to_string()).unwrap(),
        capabilities,
    );
    (sync, feed)
}

fn artist() -> UserId {
    UserId::new("artist-1".to_string()).unwrap()
}

#[tokio::test]
async fn remote_post_lifecycle() {
    let (sync, feed) = wire(StubGateway::working());

    let outcome = sync
        .create_post(
            Some(&artist()),
            "first light",
            NewPostImage::Bytes(vec![1, 2, 3]),
            None,
        )
        .await
        .unwrap();
    assert!(outcome.persisted_remotely);

    let merged = feed.refresh().await.unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].caption, "first light");

    let like = sync
        .toggle_like(Some(&artist()), &merged[0].post_uuid)
        .await
        .unwrap();
    assert!(!like.saved_locally);
    assert_eq!(like.likes_count, 1);

    sync.delete_post(Some(&artist()), &merged[0].post_uuid)
        .await
        .unwrap();
    assert!(feed.refresh().await.unwrap().is_empty());
}

#[tokio::test]
async fn degraded_gateway_keeps_activity_visible_across_reloads() {
    let (sync, feed) = wire(StubGateway::degraded());

    let outcome = sync
        .create_post(
            Some(&artist()),
            "kept offline",
            NewPostImage::StoragePath("posts/offline.png".to_string()),
            None,
        )
        .await
        .unwrap();
    assert!(!outcome.persisted_remotely);
    assert!(outcome.post.post_uuid.is_local());

    let merged = feed.refresh().await.unwrap();
    assert_eq!(merged.len(), 1);
    let post_id = merged[0].post_uuid.clone();

    let like = sync.toggle_like(Some(&artist()), &post_id).await.unwrap();
    assert!(like.saved_locally);
    assert_eq!(like.likes_count, 1);

    let comment = sync
        .add_comment(Some(&artist()), &post_id, "still works")
        .await
        .unwrap();
    assert!(comment.saved_locally);

    // Counts reconstructed from the local buckets on the next reload.
    let reloaded = feed.refresh().await.unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].likes_count, 1);
    assert_eq!(reloaded[0].comments_count, 1);
    assert_eq!(
        ImageSource::storage_path("posts/offline.png".to_string()),
        reloaded[0].image_url
    );

    let comments = feed.comments_for(&post_id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].body, "still works");
}
