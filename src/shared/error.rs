use std::fmt;

use crate::application::ports::post_gateway::{GatewayError, GatewayErrorKind};

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    MissingField(String),
    Forbidden(String),
    NotFound(String),
    SchemaMissing(String),
    Database(String),
    Network(String),
    Storage(String),
    Serialization(String),
    Configuration(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::MissingField(msg) => write!(f, "Missing field: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::SchemaMissing(msg) => write!(f, "Schema missing: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let detail = err.detail;
        match err.kind {
            GatewayErrorKind::Unauthorized => AppError::Unauthorized(detail),
            GatewayErrorKind::MissingField => AppError::MissingField(detail),
            GatewayErrorKind::Forbidden => AppError::Forbidden(detail),
            GatewayErrorKind::NotFound => AppError::NotFound(detail),
            GatewayErrorKind::SchemaMissing => AppError::SchemaMissing(detail),
            GatewayErrorKind::Network => AppError::Network(detail),
            GatewayErrorKind::Unknown => AppError::Internal(detail),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
