pub mod feed_service;
pub mod post_list;
pub mod post_sync_service;

pub use feed_service::{merge_posts, FeedService};
pub use post_list::PostListHandle;
pub use post_sync_service::{
    CommentOutcome, CreatePostOutcome, DeleteOutcome, LikeOutcome, NewPostImage, PostSyncService,
};
