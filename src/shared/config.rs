use serde::{Deserialize, Serialize};

use crate::domain::value_objects::UserId;

/// Runtime environment the client was built for. Several operations relax
/// their behavior in development (auth fallback, privileged debug endpoints).
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub environment: Environment,
    /// Development-only user id used when no session user is resolvable.
    #[serde(default)]
    pub dev_fallback_user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_url: String,
    pub bucket: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                base_url: "http://localhost:3000".to_string(),
                request_timeout: 30,
            },
            database: DatabaseConfig {
                url: "sqlite:data/artistry.db".to_string(),
                max_connections: 5,
            },
            storage: StorageConfig {
                upload_url: "http://localhost:3000/storage/v1/object".to_string(),
                bucket: "posts".to_string(),
            },
            environment: Environment::Production,
            dev_fallback_user_id: None,
        }
    }
}

impl AppConfig {
    /// Derive the capability object injected into services, so mutation logic
    /// never inspects environment flags directly.
    pub fn capabilities(&self) -> RuntimeCapabilities {
        let development = self.environment == Environment::Development;
        RuntimeCapabilities {
            dev_fallback_user_id: if development {
                self.dev_fallback_user_id
                    .as_deref()
                    .and_then(|id| UserId::new(id.to_string()).ok())
            } else {
                None
            },
            debug_endpoints: development,
        }
    }
}

/// What the current runtime is allowed to do beyond the production surface.
#[derive(Debug, Clone, Default)]
pub struct RuntimeCapabilities {
    pub dev_fallback_user_id: Option<UserId>,
    pub debug_endpoints: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_config_grants_no_capabilities() {
        let config = AppConfig {
            dev_fallback_user_id: Some("artist-1".to_string()),
            ..AppConfig::default()
        };
        let caps = config.capabilities();
        assert!(caps.dev_fallback_user_id.is_none());
        assert!(!caps.debug_endpoints);
    }

    #[test]
    fn development_config_exposes_fallback_user() {
        let config = AppConfig {
            environment: Environment::Development,
            dev_fallback_user_id: Some("artist-1".to_string()),
            ..AppConfig::default()
        };
        let caps = config.capabilities();
        assert_eq!(caps.dev_fallback_user_id.unwrap().as_str(), "artist-1");
        assert!(caps.debug_endpoints);
    }
}
