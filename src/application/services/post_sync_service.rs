use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::ports::fallback_store::FallbackStore;
use crate::application::ports::media_store::MediaStore;
use crate::application::ports::post_gateway::{NewPostRequest, PostFilters, PostGateway};
use crate::application::services::post_list::PostListHandle;
use crate::domain::entities::{Comment, Post};
use crate::domain::value_objects::{ImageSource, PostId, UserId};
use crate::infrastructure::event::{PostEvent, PostEventBus};
use crate::shared::config::RuntimeCapabilities;
use crate::shared::error::{AppError, Result};


/// Image supplied with a new post: raw bytes to upload, or a path already
/// sitting in the storage bucket.
#[derive(Debug, Clone)]
pub enum NewPostImage {
    Bytes(Vec<u8>),
    StoragePath(String),
}

#[derive(Debug)]
pub struct CreatePostOutcome {
    pub post: Post,
    /// False when the gateway rejected the create and only the local copy
    /// exists.
    pub persisted_remotely: bool,
    pub used_fallback_user_id: bool,
    pub remote_error: Option<AppError>,
}

#[derive(Debug, Clone)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: u32,
    pub saved_locally: bool,
}

#[derive(Debug, Clone)]
pub struct CommentOutcome {
    pub comment: Comment,
    pub comments_count: u32,
    pub saved_locally: bool,
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub removed_remotely: bool,
}

/// Optimistic mutation coordinator: performs user-initiated mutations against
/// the gateway, tolerates the missing-relation failure class via the fallback
/// store, and keeps the in-memory post list consistent regardless of outcome.
pub struct PostSyncService {
    gateway: Arc<dyn PostGateway>,
    fallback: Arc<dyn FallbackStore>,
    media: Arc<dyn MediaStore>,
    bus: PostEventBus,
    posts: PostListHandle,
    capabilities: RuntimeCapabilities,
}

impl PostSyncService {
    pub fn new(
        gateway: Arc<dyn PostGateway>,
        fallback: Arc<dyn FallbackStore>,
        media: Arc<dyn MediaStore>,
        bus: PostEventBus,
        posts: PostListHandle,
        capabilities: RuntimeCapabilities,
    ) -> Self {
        Self {
            gateway,
            fallback,
            media,
            bus,
            posts,
            capabilities,
        }
    }

    pub fn posts(&self) -> &PostListHandle {
        &self.posts
    }

    /// Session user when present, else the development fallback identity.
    fn resolve_actor(&self, session_user: Option<&UserId>) -> Result<UserId> {
        if let Some(user) = session_user {
            return Ok(user.clone());
        }
        self.capabilities
            .dev_fallback_user_id
            .clone()
            .ok_or_else(|| {
                AppError::Unauthorized("no session user and no fallback user id".to_string())
            })
    }

    pub async fn create_post(
        &self,
        session_user: Option<&UserId>,
        caption: &str,
        image: NewPostImage,
        filters: Option<PostFilters>,
    ) -> Result<CreatePostOutcome> {
        let caption = caption.trim();
        if caption.is_empty() {
            return Err(AppError::MissingField("caption is required".to_string()));
        }
        let image_missing = match &image {
            NewPostImage::Bytes(bytes) => bytes.is_empty(),
            NewPostImage::StoragePath(path) => path.trim().is_empty(),
        };
        if image_missing {
            return Err(AppError::MissingField("image is required".to_string()));
        }

        let actor = self.resolve_actor(session_user)?;
        let image_url = self.resolve_image(&actor, image).await;

        let request = NewPostRequest {
            user_id: actor.clone(),
            caption: caption.to_string(),
            image_url: image_url.clone(),
            filters,
        };

        match self.gateway.create_post(request).await {
            Ok(created) => {
                // Normalize: a fresh post has no likes or comments yet, and
                // the gateway response may omit the image when it stored the
                // upload path server-side.
                let mut post = created.post;
                post.likes_count = 0;
                post.comments_count = 0;
                if post.image_url.is_empty() {
                    post.image_url = image_url;
                }

                // Keep a local copy so a reload shows the post before the
                // next gateway read reflects it.
                self.fallback.prepend_post(post.clone()).await?;
                self.posts.prepend_unique(post.clone()).await;
                self.emit_created(post.clone());

                info!(post_uuid = %post.post_uuid, "post created");
                Ok(CreatePostOutcome {
                    post,
                    persisted_remotely: true,
                    used_fallback_user_id: created.used_fallback_user_id,
                    remote_error: None,
                })
            }
            Err(err) => {
                // Still record the submission locally to avoid silent data
                // loss; the error is surfaced for diagnostics.
                error!(error = %err, "gateway create failed, keeping post locally");
                let post = Post::local_draft(actor, image_url, caption.to_string());
                self.fallback.prepend_post(post.clone()).await?;
                self.posts.prepend_unique(post.clone()).await;
                self.emit_created(post.clone());

                Ok(CreatePostOutcome {
                    post,
                    persisted_remotely: false,
                    used_fallback_user_id: false,
                    remote_error: Some(err.into()),
                })
            }
        }
    }

    pub async fn toggle_like(
        &self,
        session_user: Option<&UserId>,
        post_id: &PostId,
    ) -> Result<LikeOutcome> {
        let actor = self.resolve_actor(session_user)?;

        match self.gateway.toggle_like(post_id, &actor).await {
            Ok(ack) => {
                self.posts.set_likes(post_id, ack.likes_count).await;
                self.bus.publish(PostEvent::PostsUpdated);
                Ok(LikeOutcome {
                    liked: ack.liked,
                    likes_count: ack.likes_count,
                    saved_locally: false,
                })
            }
            Err(err) if err.is_schema_missing() => {
                let liked = self.fallback.toggle_like(post_id, &actor).await?;
                let likes_count = match self.posts.adjust_likes(post_id, liked).await {
                    Some(count) => count,
                    None => self.fallback.likes_for(post_id).await?.len() as u32,
                };
                self.bus.publish(PostEvent::PostsUpdated);
                info!(post_uuid = %post_id, liked, "like saved locally, gateway table missing");
                Ok(LikeOutcome {
                    liked,
                    likes_count,
                    saved_locally: true,
                })
            }
            // Any other failure leaves the UI state untouched.
            Err(err) => Err(err.into()),
        }
    }

    pub async fn add_comment(
        &self,
        session_user: Option<&UserId>,
        post_id: &PostId,
        body: &str,
    ) -> Result<CommentOutcome> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::MissingField("comment body is required".to_string()));
        }

        let actor = self.resolve_actor(session_user)?;

        match self.gateway.add_comment(post_id, &actor, body).await {
            Ok(ack) => {
                self.posts.set_comments(post_id, ack.comments_count).await;
                self.bus.publish(PostEvent::PostsUpdated);
                Ok(CommentOutcome {
                    comment: ack.comment,
                    comments_count: ack.comments_count,
                    saved_locally: false,
                })
            }
            Err(err) if err.is_schema_missing() => {
                let comment = Comment::local(post_id.clone(), actor, body.to_string());
                self.fallback.append_comment(comment.clone()).await?;
                let comments_count = match self.posts.increment_comments(post_id).await {
                    Some(count) => count,
                    None => self.fallback.comments_for(post_id).await?.len() as u32,
                };
                self.bus.publish(PostEvent::PostsUpdated);
                info!(post_uuid = %post_id, "comment saved locally, gateway table missing");
                Ok(CommentOutcome {
                    comment,
                    comments_count,
                    saved_locally: true,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_post(
        &self,
        session_user: Option<&UserId>,
        post_id: &PostId,
    ) -> Result<DeleteOutcome> {
        let actor = self.resolve_actor(session_user)?;

        match self.gateway.delete_post(post_id, &actor).await {
            Ok(()) => {
                self.remove_locally(post_id).await?;
                info!(post_uuid = %post_id, "post deleted");
                Ok(DeleteOutcome {
                    removed_remotely: true,
                })
            }
            Err(err) => {
                // The delete may have landed despite the error; a row that is
                // already gone counts as success.
                if let Ok(false) = self.gateway.post_exists(post_id).await {
                    self.remove_locally(post_id).await?;
                    info!(post_uuid = %post_id, "delete reported an error but the row is gone");
                    return Ok(DeleteOutcome {
                        removed_remotely: true,
                    });
                }

                // Client-visible deletion always happens, even when the
                // gateway keeps the row.
                self.remove_locally(post_id).await?;

                if self.capabilities.debug_endpoints {
                    match self.gateway.debug_delete_post(post_id).await {
                        Ok(()) => {
                            info!(post_uuid = %post_id, "privileged delete succeeded");
                            return Ok(DeleteOutcome {
                                removed_remotely: true,
                            });
                        }
                        Err(debug_err) => {
                            warn!(error = %debug_err, "privileged delete also failed");
                        }
                    }
                }

                warn!(post_uuid = %post_id, error = %err, "post removed locally, remote delete failed");
                Err(err.into())
            }
        }
    }

    fn emit_created(&self, post: Post) {
        self.bus.publish(PostEvent::ClientPostCreated(post));
        self.bus.publish(PostEvent::PostsUpdated);
    }

    async fn remove_locally(&self, post_id: &PostId) -> Result<()> {
        self.posts.remove(post_id).await;
        self.fallback.remove_post_records(post_id).await?;
        self.bus.publish(PostEvent::PostsUpdated);
        Ok(())
    }

    /// Uploads the image when bytes were supplied, falling back to an inline
    /// data URL so the submission never blocks on storage availability.
    async fn resolve_image(&self, actor: &UserId, image: NewPostImage) -> ImageSource {
        match image {
            NewPostImage::StoragePath(path) => ImageSource::storage_path(path),
            NewPostImage::Bytes(bytes) => {
                let path = format!("posts/{}/{}.png", actor, Uuid::new_v4());
                match self.media.upload(&path, bytes.clone(), "image/png").await {
                    Ok(stored) => ImageSource::storage_path(stored),
                    Err(err) => {
                        warn!(error = %err, "image upload failed, using inline data URL");
                        ImageSource::data_url(&bytes, "image/png")
                    }
                }
            }
        }
    }
}
