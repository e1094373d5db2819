pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryFallbackStore;
pub use sqlite_store::SqliteFallbackStore;
