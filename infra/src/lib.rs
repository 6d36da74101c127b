//! # Infrastructure Layer
//!
//! Concrete implementations behind the core's seams:
//! - **Cache**: Redis client and the Redis-backed revocation store
//! - **Telemetry**: `tracing` subscriber setup
//! - **Environment**: `.env` loading

use std::sync::Arc;

use tg_core::errors::{DomainError, TokenError};
use tg_shared::config::CacheConfig;

/// Cache module - Redis client and revocation store
pub mod cache;

/// Telemetry module - tracing subscriber initialization
pub mod telemetry;

pub use cache::{RedisClient, RedisRevocationStore};

/// Infrastructure service container
#[derive(Clone, Debug)]
pub struct InfrastructureServices {
    /// Revocation store shared by every token manager in the process
    pub revocation_store: Arc<RedisRevocationStore>,
}

/// Connect the infrastructure services
///
/// Fails if Redis cannot be reached or does not answer the health check.
pub async fn initialize(config: &CacheConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    let client = RedisClient::new(config.clone()).await?;
    if !client.health_check().await? {
        return Err(InfrastructureError::Config(
            "Redis health check returned an unexpected response".to_string(),
        ));
    }

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        revocation_store: Arc::new(RedisRevocationStore::new(client)),
    })
}

/// Load `.env` if present
///
/// Returns the path of the loaded file, `None` when there is none. Variables
/// already set in the process environment are never overridden.
pub fn load_env() -> Option<std::path::PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(_) => None,
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Operation did not complete in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::Token(TokenError::StoreUnavailable {
            message: error.to_string(),
        })
    }
}
