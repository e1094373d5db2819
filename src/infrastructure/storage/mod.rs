pub mod http_media_store;

pub use http_media_store::HttpMediaStore;
