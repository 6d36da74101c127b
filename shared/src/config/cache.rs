//! Redis configuration for the revocation store

use serde::{Deserialize, Serialize};

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Response timeout in milliseconds
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Maximum attempts for a single command
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Enable cache key prefix
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            max_connections: 10,
            connection_timeout: 5,
            response_timeout_ms: default_response_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let max_connections = std::env::var("REDIS_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let response_timeout_ms = std::env::var("REDIS_RESPONSE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_response_timeout_ms);
        let key_prefix = std::env::var("REDIS_KEY_PREFIX")
            .ok()
            .filter(|p| !p.is_empty());

        Self {
            url,
            max_connections,
            response_timeout_ms,
            key_prefix,
            ..Default::default()
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Set the retry policy
    pub fn with_retries(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_response_timeout_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    50
}
