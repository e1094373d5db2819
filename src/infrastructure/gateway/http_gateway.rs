use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;

use crate::application::ports::post_gateway::{
    CommentAck, CreatedPost, GatewayError, GatewayErrorKind, LikeAck, NewPostRequest, PostGateway,
};
use crate::domain::entities::{Comment, Post};
use crate::domain::value_objects::{ImageSource, PostId, UserId};
use crate::shared::config::GatewayConfig;
use crate::shared::error::AppError;

/// Substring the gateway emits when a backing relation does not exist.
/// Brittleness is contained here: everything downstream sees a structured
/// error kind instead of matching strings.
const TABLE_MISSING_MARKER: &str = "Could not find the table 'public.";
const FILTERS_COLUMN_MARKER: &str = "Could not find the 'filters' column";

/// reqwest adapter over the remote data gateway's HTTP contract.
pub struct HttpPostGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPostGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and unwraps the gateway's `{ success, error, ... }`
    /// envelope, classifying failures into structured kinds.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        // Some gateway failures return non-JSON bodies; tolerate them.
        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

        let success = payload
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !status.is_success() || !success {
            let detail = error_detail(&payload, status, &body);
            return Err(GatewayError::new(classify(status, &detail), detail));
        }

        Ok(payload)
    }
}

fn error_detail(payload: &Value, status: StatusCode, raw_body: &str) -> String {
    match payload.get("error") {
        Some(Value::String(message)) => message.clone(),
        // Structured PostgREST-style error objects carry the message field.
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
        Some(other) if !other.is_null() => other.to_string(),
        _ if !raw_body.trim().is_empty() => raw_body.trim().to_string(),
        _ => format!("status {status}"),
    }
}

fn classify(status: StatusCode, detail: &str) -> GatewayErrorKind {
    if detail.contains(TABLE_MISSING_MARKER) {
        return GatewayErrorKind::SchemaMissing;
    }
    match status {
        StatusCode::UNAUTHORIZED => GatewayErrorKind::Unauthorized,
        StatusCode::FORBIDDEN => GatewayErrorKind::Forbidden,
        StatusCode::NOT_FOUND => GatewayErrorKind::NotFound,
        StatusCode::BAD_REQUEST => GatewayErrorKind::MissingField,
        _ => GatewayErrorKind::Unknown,
    }
}

#[derive(Debug, Deserialize)]
struct PostDto {
    post_uuid: String,
    user_id: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    likes_count: Option<u32>,
    #[serde(default)]
    comments_count: Option<u32>,
    // Embedded relation rows from feed reads; counts are derived from their
    // lengths when the gateway did not precompute them.
    #[serde(default)]
    post_likes: Option<Vec<Value>>,
    #[serde(default)]
    post_comments: Option<Vec<Value>>,
}

impl PostDto {
    fn into_post(self) -> Result<Post, GatewayError> {
        let likes_count = self
            .likes_count
            .unwrap_or_else(|| self.post_likes.as_ref().map_or(0, |rows| rows.len() as u32));
        let comments_count = self.comments_count.unwrap_or_else(|| {
            self.post_comments
                .as_ref()
                .map_or(0, |rows| rows.len() as u32)
        });

        Ok(Post {
            post_uuid: PostId::new(self.post_uuid).map_err(GatewayError::unknown)?,
            user_id: UserId::new(self.user_id).map_err(GatewayError::unknown)?,
            image_url: ImageSource::from(self.image_url.unwrap_or_default()),
            caption: self.caption.unwrap_or_default(),
            created_at: parse_timestamp(self.created_at.as_deref()),
            likes_count,
            comments_count,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CommentDto {
    id: Value,
    post_uuid: String,
    user_id: String,
    body: String,
    #[serde(default)]
    created_at: Option<String>,
}

impl CommentDto {
    fn into_comment(self) -> Result<Comment, GatewayError> {
        let id = match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(Comment {
            id,
            post_uuid: PostId::new(self.post_uuid).map_err(GatewayError::unknown)?,
            user_id: UserId::new(self.user_id).map_err(GatewayError::unknown)?,
            body: self.body,
            created_at: parse_timestamp(self.created_at.as_deref()),
        })
    }
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

fn posts_from_payload(payload: &Value, field: &str) -> Result<Vec<Post>, GatewayError> {
    let dtos: Vec<PostDto> =
        serde_json::from_value(payload.get(field).cloned().unwrap_or(Value::Array(vec![])))
            .map_err(|e| GatewayError::unknown(format!("Malformed posts payload: {e}")))?;
    dtos.into_iter().map(PostDto::into_post).collect()
}

#[async_trait]
impl PostGateway for HttpPostGateway {
    async fn create_post(&self, request: NewPostRequest) -> Result<CreatedPost, GatewayError> {
        let mut payload = json!({
            "user_id": request.user_id.as_str(),
            "caption": request.caption,
            "image_url": request.image_url.as_str(),
        });
        if let Some(filters) = &request.filters {
            payload["filters"] = serde_json::to_value(filters)
                .map_err(|e| GatewayError::unknown(e.to_string()))?;
        }

        let url = self.url("/api/posts/create");
        let mut result = self.execute(self.client.post(&url).json(&payload)).await;

        // The gateway may predate the filters column; retry once without it.
        if let Err(err) = &result {
            if request.filters.is_some() && err.detail.contains(FILTERS_COLUMN_MARKER) {
                warn!("gateway rejected filters column, retrying without it");
                if let Some(map) = payload.as_object_mut() {
                    map.remove("filters");
                }
                result = self.execute(self.client.post(&url).json(&payload)).await;
            }
        }

        let payload = result?;
        let dto: PostDto = serde_json::from_value(payload.get("post").cloned().unwrap_or(Value::Null))
            .map_err(|e| GatewayError::unknown(format!("Malformed post payload: {e}")))?;
        let used_fallback_user_id = payload
            .get("usedFallbackUserId")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(CreatedPost {
            post: dto.into_post()?,
            used_fallback_user_id,
        })
    }

    async fn toggle_like(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<LikeAck, GatewayError> {
        let url = self.url(&format!("/api/posts/{}/like", post_id));
        let payload = self
            .execute(
                self.client
                    .post(&url)
                    .json(&json!({ "user_id": user_id.as_str() })),
            )
            .await?;

        Ok(LikeAck {
            liked: payload.get("liked").and_then(Value::as_bool).unwrap_or(false),
            likes_count: payload
                .get("likes_count")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
        })
    }

    async fn add_comment(
        &self,
        post_id: &PostId,
        user_id: &UserId,
        body: &str,
    ) -> Result<CommentAck, GatewayError> {
        let url = self.url(&format!("/api/posts/{}/comments", post_id));
        let payload = self
            .execute(
                self.client
                    .post(&url)
                    .json(&json!({ "body": body, "user_id": user_id.as_str() })),
            )
            .await?;

        let dto: CommentDto =
            serde_json::from_value(payload.get("comment").cloned().unwrap_or(Value::Null))
                .map_err(|e| GatewayError::unknown(format!("Malformed comment payload: {e}")))?;

        Ok(CommentAck {
            comment: dto.into_comment()?,
            comments_count: payload
                .get("comments_count")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
        })
    }

    async fn fetch_comments(&self, post_id: &PostId) -> Result<Vec<Comment>, GatewayError> {
        let url = self.url(&format!("/api/posts/{}/comments/get", post_id));
        let payload = self.execute(self.client.get(&url)).await?;

        let dtos: Vec<CommentDto> = serde_json::from_value(
            payload.get("comments").cloned().unwrap_or(Value::Array(vec![])),
        )
        .map_err(|e| GatewayError::unknown(format!("Malformed comments payload: {e}")))?;

        dtos.into_iter().map(CommentDto::into_comment).collect()
    }

    async fn delete_post(&self, post_id: &PostId, user_id: &UserId) -> Result<(), GatewayError> {
        let url = self.url(&format!("/api/posts/{}", post_id));
        self.execute(
            self.client
                .delete(&url)
                .json(&json!({ "user_id": user_id.as_str() })),
        )
        .await?;
        Ok(())
    }

    async fn post_exists(&self, post_id: &PostId) -> Result<bool, GatewayError> {
        let url = self.url(&format!("/api/posts/{}", post_id));
        match self.execute(self.client.get(&url)).await {
            Ok(payload) => Ok(payload.get("post").map_or(false, |p| !p.is_null())),
            Err(err) if err.kind == GatewayErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn fetch_posts(&self, user_id: &UserId, limit: u32) -> Result<Vec<Post>, GatewayError> {
        let url = self.url(&format!("/api/posts/for/{}", user_id));
        let payload = self
            .execute(self.client.get(&url).query(&[("limit", limit)]))
            .await?;
        posts_from_payload(&payload, "posts")
    }

    async fn debug_fetch_posts(&self, user_id: &UserId) -> Result<Vec<Post>, GatewayError> {
        let url = self.url("/api/debug/posts-for");
        let payload = self
            .execute(self.client.get(&url).query(&[("id", user_id.as_str())]))
            .await?;
        posts_from_payload(&payload, "posts")
    }

    async fn debug_delete_post(&self, post_id: &PostId) -> Result<(), GatewayError> {
        let url = self.url("/api/debug/posts/delete");
        self.execute(
            self.client
                .post(&url)
                .json(&json!({ "post_uuid": post_id.as_str() })),
        )
        .await?;
        Ok(())
    }
}
