//! Tests for the token services

mod manager_tests;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::Principal;
use crate::errors::DomainError;
use crate::repositories::RevocationStore;
use crate::services::token::{KeyProvider, Rs256KeyManager, TokenServiceConfig};

pub(super) const PRIVATE_KEY_PEM: &str = include_str!("../../../../tests/fixtures/jwt_private_key.pem");
pub(super) const PUBLIC_KEY_PEM: &str = include_str!("../../../../tests/fixtures/jwt_public_key.pem");
pub(super) const OTHER_PRIVATE_KEY_PEM: &str = include_str!("../../../../tests/fixtures/other_private_key.pem");
pub(super) const OTHER_PUBLIC_KEY_PEM: &str = include_str!("../../../../tests/fixtures/other_public_key.pem");
pub(super) const WEAK_PRIVATE_KEY_PEM: &str = include_str!("../../../../tests/fixtures/weak_private_key.pem");
pub(super) const WEAK_PUBLIC_KEY_PEM: &str = include_str!("../../../../tests/fixtures/weak_public_key.pem");
pub(super) const PKCS1_PRIVATE_KEY_PEM: &str = include_str!("../../../../tests/fixtures/jwt_private_key_pkcs1.pem");

pub(super) fn keys() -> Arc<dyn KeyProvider> {
    Arc::new(Rs256KeyManager::from_pem_strings(PRIVATE_KEY_PEM, PUBLIC_KEY_PEM).unwrap())
}

pub(super) fn other_keys() -> Arc<dyn KeyProvider> {
    Arc::new(Rs256KeyManager::from_pem_strings(OTHER_PRIVATE_KEY_PEM, OTHER_PUBLIC_KEY_PEM).unwrap())
}

pub(super) fn config() -> TokenServiceConfig {
    TokenServiceConfig {
        issuer: "tokengate".to_string(),
        audience: "tokengate-api".to_string(),
        access_token_ttl: chrono::Duration::minutes(15),
        refresh_token_ttl: chrono::Duration::days(7),
        key_id: "test-key".to_string(),
        store_timeout: Duration::from_millis(100),
        ..TokenServiceConfig::default()
    }
}

pub(super) fn principal() -> Principal {
    Principal::new("u1", "a@example.com", ["USER"])
}

/// Store whose every call fails as if the backend were down
pub(super) struct UnavailableStore;

#[async_trait]
impl RevocationStore for UnavailableStore {
    async fn blacklist_access(&self, _jti: &str, _expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        Err(DomainError::store("connection refused"))
    }

    async fn is_access_blacklisted(&self, _jti: &str) -> Result<bool, DomainError> {
        Err(DomainError::store("connection refused"))
    }

    async fn whitelist_refresh(&self, _jti: &str, _expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        Err(DomainError::store("connection refused"))
    }

    async fn is_refresh_whitelisted(&self, _jti: &str) -> Result<bool, DomainError> {
        Err(DomainError::store("connection refused"))
    }

    async fn remove_refresh(&self, _jti: &str) -> Result<bool, DomainError> {
        Err(DomainError::store("connection refused"))
    }
}

/// Store that never answers within any reasonable timeout
pub(super) struct HangingStore;

impl HangingStore {
    async fn hang<T>(value: T) -> Result<T, DomainError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(value)
    }
}

#[async_trait]
impl RevocationStore for HangingStore {
    async fn blacklist_access(&self, _jti: &str, _expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        Self::hang(()).await
    }

    async fn is_access_blacklisted(&self, _jti: &str) -> Result<bool, DomainError> {
        Self::hang(false).await
    }

    async fn whitelist_refresh(&self, _jti: &str, _expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        Self::hang(()).await
    }

    async fn is_refresh_whitelisted(&self, _jti: &str) -> Result<bool, DomainError> {
        Self::hang(true).await
    }

    async fn remove_refresh(&self, _jti: &str) -> Result<bool, DomainError> {
        Self::hang(true).await
    }
}

/// Replaces the character at `index` with a different base64url character
pub(super) fn flip_char(segment: &str, index: usize) -> String {
    let mut chars: Vec<char> = segment.chars().collect();
    chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}

/// Splits a compact token into its three segments
pub(super) fn segments(token: &str) -> (String, String, String) {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3);
    (parts[0].to_string(), parts[1].to_string(), parts[2].to_string())
}
