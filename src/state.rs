use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::application::services::{FeedService, PostListHandle, PostSyncService};
use crate::domain::value_objects::UserId;
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::event::PostEventBus;
use crate::infrastructure::fallback::SqliteFallbackStore;
use crate::infrastructure::gateway::HttpPostGateway;
use crate::infrastructure::storage::HttpMediaStore;
use crate::shared::config::AppConfig;
use crate::shared::error::{AppError, Result};

/// Wired application graph for one signed-in user.
pub struct AppState {
    pub config: AppConfig,
    pub pool: ConnectionPool,
    pub events: PostEventBus,
    pub posts: PostListHandle,
    pub sync: Arc<PostSyncService>,
    pub feed: Arc<FeedService>,
    feed_listener: JoinHandle<()>,
}

impl AppState {
    pub async fn new(config: AppConfig, user: UserId) -> Result<Self> {
        ensure_database_dir(&config.database.url)?;
        let pool = ConnectionPool::new(&config.database.url, config.database.max_connections)
            .await
            .map_err(AppError::from)?;
        pool.migrate().await?;

        let capabilities = config.capabilities();
        let gateway = Arc::new(HttpPostGateway::new(&config.gateway)?);
        let media = Arc::new(HttpMediaStore::new(&config.storage)?);
        let fallback = Arc::new(SqliteFallbackStore::new(pool.clone()));
        let events = PostEventBus::new();
        let posts = PostListHandle::new();

        let sync = Arc::new(PostSyncService::new(
            gateway.clone(),
            fallback.clone(),
            media,
            events.clone(),
            posts.clone(),
            capabilities.clone(),
        ));
        let feed = Arc::new(FeedService::new(
            gateway,
            fallback,
            posts.clone(),
            user,
            capabilities,
        ));
        let feed_listener = FeedService::spawn_listener(feed.clone(), &events);

        info!(gateway = %config.gateway.base_url, "application state initialized");
        Ok(Self {
            config,
            pool,
            events,
            posts,
            sync,
            feed,
            feed_listener,
        })
    }

    pub async fn shutdown(self) {
        self.feed_listener.abort();
        self.pool.close().await;
    }
}

/// The pool can create the database file but not its parent directory.
fn ensure_database_dir(database_url: &str) -> Result<()> {
    let path = database_url.trim_start_matches("sqlite:");
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create database dir: {e}")))?;
        }
    }
    Ok(())
}
