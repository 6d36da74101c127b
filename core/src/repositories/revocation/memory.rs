//! In-process revocation store backed by two maps with lazy expiry

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::DomainError;

use super::r#trait::RevocationStore;

/// In-memory revocation store
///
/// Elapsed entries are invisible to every read and are dropped on the next
/// write touching them, or in bulk by [`purge_expired`](Self::purge_expired).
/// No background task is spawned.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRevocationStore {
    blacklist: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    whitelist: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryRevocationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every elapsed entry from both namespaces
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    pub(crate) async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;

        {
            let mut blacklist = self.blacklist.write().await;
            let before = blacklist.len();
            blacklist.retain(|_, expires_at| *expires_at > now);
            removed += before - blacklist.len();
        }

        {
            let mut whitelist = self.whitelist.write().await;
            let before = whitelist.len();
            whitelist.retain(|_, expires_at| *expires_at > now);
            removed += before - whitelist.len();
        }

        if removed > 0 {
            debug!(removed, "Purged expired revocation entries");
        }

        removed
    }

    /// Number of live entries as `(blacklisted, whitelisted)`
    pub async fn entry_counts(&self) -> (usize, usize) {
        let now = Utc::now();
        let blacklisted = self.blacklist.read().await.values().filter(|e| **e > now).count();
        let whitelisted = self.whitelist.read().await.values().filter(|e| **e > now).count();
        (blacklisted, whitelisted)
    }

    async fn is_live(map: &RwLock<HashMap<String, DateTime<Utc>>>, jti: &str) -> bool {
        let now = Utc::now();
        map.read()
            .await
            .get(jti)
            .map(|expires_at| *expires_at > now)
            .unwrap_or(false)
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn blacklist_access(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        if expires_at <= Utc::now() {
            return Ok(());
        }

        let mut blacklist = self.blacklist.write().await;
        // Never shorten an existing revocation
        let entry = blacklist.entry(jti.to_string()).or_insert(expires_at);
        if *entry < expires_at {
            *entry = expires_at;
        }
        Ok(())
    }

    async fn is_access_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(Self::is_live(&self.blacklist, jti).await)
    }

    async fn whitelist_refresh(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        if expires_at <= Utc::now() {
            return Ok(());
        }

        self.whitelist.write().await.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_refresh_whitelisted(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(Self::is_live(&self.whitelist, jti).await)
    }

    async fn remove_refresh(&self, jti: &str) -> Result<bool, DomainError> {
        let now = Utc::now();
        let removed = self.whitelist.write().await.remove(jti);
        Ok(matches!(removed, Some(expires_at) if expires_at > now))
    }
}
