pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{FallbackStore, MediaStore, PostGateway};
pub use application::services::{FeedService, PostListHandle, PostSyncService};
pub use domain::entities::{Comment, Post};
pub use domain::value_objects::{ImageSource, PostId, UserId};
pub use shared::{AppConfig, AppError, Result};
pub use state::AppState;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artistry_client=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
