pub mod config;
pub mod error;

pub use config::{AppConfig, Environment, RuntimeCapabilities};
pub use error::{AppError, Result};
