//! Configuration module
//!
//! - `auth` - Token signing, lifetimes and revocation-check policy
//! - `cache` - Redis connection settings for the revocation store
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod cache;
pub mod environment;

use serde::{Deserialize, Serialize};

pub use auth::{JwtConfig, RevocationCheckPolicy};
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete configuration consumed by the token lifecycle services
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Token configuration
    pub jwt: JwtConfig,

    /// Revocation store configuration
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            jwt: JwtConfig::from_env(),
            cache: CacheConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }
}
