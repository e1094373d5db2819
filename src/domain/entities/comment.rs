use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{PostId, UserId};

/// Append-only from this layer's perspective: there is no edit or delete
/// path for comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_uuid: PostId,
    pub user_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Comment created while the gateway's comments relation was missing.
    pub fn local(post_uuid: PostId, user_id: UserId, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: format!("local-{}", now.timestamp_millis()),
            post_uuid,
            user_id,
            body,
            created_at: now,
        }
    }
}
