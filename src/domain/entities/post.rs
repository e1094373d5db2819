use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ImageSource, PostId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_uuid: PostId,
    pub user_id: UserId,
    pub image_url: ImageSource,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: u32,
    pub comments_count: u32,
}

impl Post {
    pub fn new(post_uuid: PostId, user_id: UserId, image_url: ImageSource, caption: String) -> Self {
        Self {
            post_uuid,
            user_id,
            image_url,
            caption,
            created_at: Utc::now(),
            likes_count: 0,
            comments_count: 0,
        }
    }

    /// Provisional post for a submission the gateway could not persist.
    pub fn local_draft(user_id: UserId, image_url: ImageSource, caption: String) -> Self {
        let now = Utc::now();
        Self {
            post_uuid: PostId::local(now.timestamp_millis()),
            user_id,
            image_url,
            caption,
            created_at: now,
            likes_count: 0,
            comments_count: 0,
        }
    }

    pub fn increment_likes(&mut self) {
        self.likes_count += 1;
    }

    pub fn decrement_likes(&mut self) {
        if self.likes_count > 0 {
            self.likes_count -= 1;
        }
    }

    pub fn increment_comments(&mut self) {
        self.comments_count += 1;
    }
}
