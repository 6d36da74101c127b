//! Revocation store trait: the blacklist of revoked access tokens and the
//! whitelist of refresh tokens that may still be rotated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainError;

/// TTL-indexed store keyed by `jti`
///
/// Blacklist and whitelist are disjoint namespaces: the same `jti` in both
/// never interferes. Every entry expires together with the token it belongs
/// to, so implementations never need a separate sweep to stay bounded.
///
/// Implementations must be shareable across process instances for
/// revocation to hold cluster-wide; the in-memory implementation is for
/// single-process deployments and tests.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Blacklist an access token until `expires_at`
    ///
    /// Idempotent. A no-op when `expires_at` is already in the past.
    async fn blacklist_access(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Check whether an access token has been blacklisted
    async fn is_access_blacklisted(&self, jti: &str) -> Result<bool, DomainError>;

    /// Register a refresh token as usable until `expires_at`
    ///
    /// Idempotent. A no-op when `expires_at` is already in the past.
    async fn whitelist_refresh(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Check whether a refresh token is currently whitelisted
    ///
    /// Observation only. Rotation must go through [`remove_refresh`](Self::remove_refresh).
    async fn is_refresh_whitelisted(&self, jti: &str) -> Result<bool, DomainError>;

    /// Atomically remove a refresh token from the whitelist
    ///
    /// # Returns
    /// * `Ok(true)` - An unexpired entry existed and this call removed it
    /// * `Ok(false)` - Nothing to remove (never whitelisted, already consumed, or expired)
    /// * `Err(DomainError)` - Store unreachable
    ///
    /// Of any number of concurrent calls for the same `jti`, at most one
    /// observes `true`.
    async fn remove_refresh(&self, jti: &str) -> Result<bool, DomainError>;
}

/// Remaining lifetime of an entry expiring at `expires_at`
///
/// Returns `None` when the entry would already be expired at `now`.
pub fn ttl_until(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<std::time::Duration> {
    (expires_at - now)
        .to_std()
        .ok()
        .filter(|ttl| !ttl.is_zero())
}
