//! Redis-backed revocation store shared by every service instance
//!
//! Key layout, before the optional global prefix:
//! - `jwt:access:blacklist:{jti}` for revoked access tokens
//! - `jwt:refresh:whitelist:{jti}` for refresh tokens that may still rotate
//!
//! Each key carries a TTL equal to the token's remaining lifetime, rounded up
//! to whole seconds, so entries vanish when the token would expire anyway.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use tg_core::errors::DomainError;
use tg_core::repositories::revocation::{ttl_until, RevocationStore};
use tg_shared::config::CacheConfig;

use super::redis_client::RedisClient;

const ACCESS_BLACKLIST_PREFIX: &str = "jwt:access:blacklist:";
const REFRESH_WHITELIST_PREFIX: &str = "jwt:refresh:whitelist:";
const PRESENCE_MARKER: &str = "1";

/// Revocation store on top of [`RedisClient`]
///
/// Every operation is a single Redis command, so each is atomic on the
/// server. `remove_refresh` relies on `DEL` reporting the number of deleted
/// keys: of concurrent removals of the same key only one sees a count of one.
#[derive(Debug, Clone)]
pub struct RedisRevocationStore {
    client: RedisClient,
}

impl RedisRevocationStore {
    pub fn new(client: RedisClient) -> Self {
        info!("Redis revocation store ready");
        Self { client }
    }

    /// Full key of a blacklisted access token
    pub fn blacklist_key(&self, jti: &str) -> String {
        blacklist_key(self.client.config(), jti)
    }

    /// Full key of a whitelisted refresh token
    pub fn whitelist_key(&self, jti: &str) -> String {
        whitelist_key(self.client.config(), jti)
    }

    /// Underlying client, e.g. for health checks
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    async fn put_until(&self, key: String, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        let Some(ttl_seconds) = ttl_seconds(expires_at, Utc::now()) else {
            debug!("Skipping write of '{}': token already expired", key);
            return Ok(());
        };

        self.client
            .set_with_expiry(&key, PRESENCE_MARKER, ttl_seconds)
            .await
            .map_err(DomainError::from)
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn blacklist_access(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.put_until(self.blacklist_key(jti), expires_at).await
    }

    async fn is_access_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(self.client.exists(&self.blacklist_key(jti)).await?)
    }

    async fn whitelist_refresh(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.put_until(self.whitelist_key(jti), expires_at).await
    }

    async fn is_refresh_whitelisted(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(self.client.exists(&self.whitelist_key(jti)).await?)
    }

    async fn remove_refresh(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(self.client.delete(&self.whitelist_key(jti)).await?)
    }
}

pub(crate) fn blacklist_key(config: &CacheConfig, jti: &str) -> String {
    config.make_key(&format!("{}{}", ACCESS_BLACKLIST_PREFIX, jti))
}

pub(crate) fn whitelist_key(config: &CacheConfig, jti: &str) -> String {
    config.make_key(&format!("{}{}", REFRESH_WHITELIST_PREFIX, jti))
}

/// Remaining lifetime in whole seconds, rounded up; `None` once elapsed
pub(crate) fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    ttl_until(expires_at, now).map(|ttl| {
        let seconds = ttl.as_secs();
        if ttl.subsec_nanos() > 0 {
            seconds + 1
        } else {
            seconds
        }
    })
}
