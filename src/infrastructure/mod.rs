pub mod database;
pub mod event;
pub mod fallback;
pub mod gateway;
pub mod storage;
