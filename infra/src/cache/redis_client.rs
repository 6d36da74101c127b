//! Redis client used by the revocation store
//!
//! A single multiplexed connection shared by every clone, with bounded
//! retries for transient failures and a response timeout on every attempt.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use tg_shared::config::CacheConfig;

use crate::InfrastructureError;

/// Upper bound for the exponential backoff between attempts
const MAX_RETRY_DELAY_MS: u64 = 5000;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client with connection reuse and retry logic
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("url", &mask_url(&self.config.url))
            .field("max_retries", &self.config.max_retries)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Connect to Redis
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Example
    /// ```no_run
    /// use tg_infra::cache::RedisClient;
    /// use tg_shared::config::CacheConfig;
    ///
    /// async fn create_client() -> Result<RedisClient, tg_infra::InfrastructureError> {
    ///     RedisClient::new(CacheConfig::new("redis://localhost:6379")).await
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            "Creating Redis client with URL: {} and max connections: {}",
            mask_url(&config.url),
            config.max_connections
        );

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));
        let max_attempts = config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let error = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(Ok(connection)) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Timeout(format!(
                    "connect timed out after {}s",
                    connect_timeout.as_secs()
                )),
            };

            if attempts >= max_attempts {
                error!("Failed to connect to Redis after {} attempts: {}", attempts, error);
                return Err(error);
            }

            warn!(
                "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                attempts, max_attempts, error, delay
            );
            sleep(Duration::from_millis(delay)).await;
            delay = next_delay(delay);
        }
    }

    /// Set a value with expiration time
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `value` - Value to store
    /// * `expiry_seconds` - Time to live in seconds, at least one
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        let expiry = expiry_seconds.max(1);
        self.execute_with_retry("SET", |mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry).await })
        })
        .await
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        let exists = self
            .execute_with_retry("EXISTS", |mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.exists::<_, bool>(key).await })
            })
            .await?;

        debug!("Key '{}' exists: {}", key, exists);
        Ok(exists)
    }

    /// Delete a key
    ///
    /// # Returns
    /// * `Ok(true)` - This call deleted the key
    /// * `Ok(false)` - The key did not exist
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let deleted_count = self
            .execute_with_retry("DEL", |mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await?;

        debug!("Deleted key '{}': {}", key, deleted_count > 0);
        Ok(deleted_count > 0)
    }

    /// Get time-to-live for a key in seconds, `None` if missing or persistent
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let ttl = self
            .execute_with_retry("TTL", |mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await?;

        Ok((ttl >= 0).then_some(ttl))
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let response = self
            .execute_with_retry("PING", |mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await?;

        if response == "PONG" {
            debug!("Redis health check passed");
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    /// Configuration this client was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Execute a Redis operation with retries and a per-attempt timeout
    async fn execute_with_retry<F, T>(
        &self,
        command: &'static str,
        operation: F,
    ) -> Result<T, InfrastructureError>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let response_timeout = Duration::from_millis(self.config.response_timeout_ms.max(1));
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;

            let (error, retriable) = match timeout(response_timeout, operation(self.connection.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    let retriable = is_retriable_error(&e);
                    (InfrastructureError::Cache(e), retriable)
                }
                Err(_) => (
                    InfrastructureError::Timeout(format!(
                        "{} timed out after {}ms",
                        command,
                        response_timeout.as_millis()
                    )),
                    true,
                ),
            };

            if !retriable || attempts >= max_attempts {
                error!("Redis {} failed after {} attempts: {}", command, attempts, error);
                return Err(error);
            }

            warn!(
                "Redis {} failed (attempt {}/{}): {}. Retrying in {}ms...",
                command, attempts, max_attempts, error, delay
            );
            sleep(Duration::from_millis(delay)).await;
            delay = next_delay(delay);
        }
    }
}

/// Exponential backoff with a cap
fn next_delay(delay: u64) -> u64 {
    delay.saturating_mul(2).clamp(1, MAX_RETRY_DELAY_MS)
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    ) || error.is_timeout()
        || error.is_connection_dropped()
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.rfind('@'), url.find("://")) {
        if at_pos > proto_end {
            return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
        }
    }
    url.to_string()
}
