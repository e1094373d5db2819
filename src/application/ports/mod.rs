pub mod fallback_store;
pub mod media_store;
pub mod post_gateway;

pub use fallback_store::FallbackStore;
pub use media_store::MediaStore;
pub use post_gateway::PostGateway;
