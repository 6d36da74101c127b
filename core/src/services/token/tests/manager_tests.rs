//! Tests for the token lifecycle manager

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use super::*;
use crate::domain::entities::{TokenKind, TOKEN_TYPE_BEARER};
use crate::errors::TokenError;
use crate::repositories::{InMemoryRevocationStore, RevocationStore};
use crate::services::token::TokenManager;

fn manager() -> (TokenManager<InMemoryRevocationStore>, Arc<InMemoryRevocationStore>) {
    let store = Arc::new(InMemoryRevocationStore::new());
    let manager = TokenManager::new(keys(), Arc::clone(&store), config()).unwrap();
    (manager, store)
}

fn jti<S: RevocationStore + ?Sized>(manager: &TokenManager<S>, token: &str, kind: TokenKind) -> String {
    manager
        .validator()
        .verify(token, kind)
        .into_claims()
        .expect("token should verify")
        .jti
}

fn assert_invalid_or_used(result: Result<crate::domain::entities::TokenPair, DomainError>) {
    match result {
        Err(DomainError::Token(TokenError::InvalidOrUsedRefreshToken)) => {}
        Err(other) => panic!("expected invalid-or-used error, got {:?}", other),
        Ok(_) => panic!("expected rotation to fail"),
    }
}

#[test]
fn test_rejects_inconsistent_config() {
    let mut config = config();
    config.refresh_token_ttl = config.access_token_ttl;

    let result = TokenManager::new(keys(), Arc::new(InMemoryRevocationStore::new()), config);
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_issue_tokens() {
    let (manager, store) = manager();
    let now = Utc::now();

    let pair = manager.issue_tokens(&principal()).await.unwrap();

    assert_eq!(pair.token_type, TOKEN_TYPE_BEARER);
    assert!(pair.access_expires_at < pair.refresh_expires_at);
    assert!(pair.access_expires_in(now) <= 900);

    let refresh_jti = jti(&manager, &pair.refresh_token, TokenKind::Refresh);
    let access_jti = jti(&manager, &pair.access_token, TokenKind::Access);
    assert!(store.is_refresh_whitelisted(&refresh_jti).await.unwrap());
    assert!(!store.is_refresh_whitelisted(&access_jti).await.unwrap());
    assert!(manager.validate(&pair.access_token, TokenKind::Access).await.is_valid());
}

#[tokio::test]
async fn test_refresh_token_rotates_exactly_once() {
    let (manager, _store) = manager();
    let original = manager.issue_tokens(&principal()).await.unwrap();

    let rotated = manager.rotate_refresh(&original.refresh_token).await.unwrap();
    assert_ne!(rotated.access_token, original.access_token);
    assert_ne!(rotated.refresh_token, original.refresh_token);

    assert_invalid_or_used(manager.rotate_refresh(&original.refresh_token).await);

    // The replacement is itself usable once
    assert!(manager.rotate_refresh(&rotated.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_rotation_preserves_principal() {
    let (manager, _store) = manager();
    let principal = Principal::new("u7", "admin@example.com", ["ADMIN", "USER"]);
    let original = manager.issue_tokens(&principal).await.unwrap();

    let rotated = manager.rotate_refresh(&original.refresh_token).await.unwrap();
    let claims = manager
        .validate(&rotated.access_token, TokenKind::Access)
        .await
        .into_claims()
        .unwrap();

    assert_eq!(claims.principal(), principal);
}

#[tokio::test]
async fn test_rotation_rejects_non_refresh_tokens() {
    let (manager, _store) = manager();
    let pair = manager.issue_tokens(&principal()).await.unwrap();

    assert_invalid_or_used(manager.rotate_refresh(&pair.access_token).await);
    assert_invalid_or_used(manager.rotate_refresh("garbage").await);
    assert_invalid_or_used(manager.rotate_refresh("").await);
}

#[tokio::test]
async fn test_rotation_rejects_unregistered_refresh_token() {
    let (manager, _store) = manager();
    // Correctly signed but never whitelisted
    let stray = manager
        .creator()
        .create(&principal(), TokenKind::Refresh)
        .unwrap();

    let error = manager.rotate_refresh(&stray.token).await.unwrap_err();
    assert_eq!(error.status_code(), 401);
    assert_eq!(error.to_string(), "Invalid or already used refresh token");
}

#[tokio::test]
async fn test_concurrent_rotation_succeeds_once() {
    let (manager, _store) = manager();
    let pair = manager.issue_tokens(&principal()).await.unwrap();

    let (first, second) = tokio::join!(
        manager.rotate_refresh(&pair.refresh_token),
        manager.rotate_refresh(&pair.refresh_token),
    );

    assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_rotation_succeeds_once() {
    let (manager, _store) = manager();
    let manager = Arc::new(manager);
    let pair = manager.issue_tokens(&principal()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        let token = pair.refresh_token.clone();
        handles.push(tokio::spawn(async move { manager.rotate_refresh(&token).await.is_ok() }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let (manager, store) = manager();
    let pair = manager.issue_tokens(&principal()).await.unwrap();
    let refresh_jti = jti(&manager, &pair.refresh_token, TokenKind::Refresh);

    assert!(!manager.is_access_revoked(&pair.access_token).await);

    manager
        .logout(Some(&pair.access_token), Some(&pair.refresh_token))
        .await;
    assert!(manager.is_access_revoked(&pair.access_token).await);
    assert!(!store.is_refresh_whitelisted(&refresh_jti).await.unwrap());

    manager
        .logout(Some(&pair.access_token), Some(&pair.refresh_token))
        .await;
    assert!(manager.is_access_revoked(&pair.access_token).await);
    assert_invalid_or_used(manager.rotate_refresh(&pair.refresh_token).await);
}

#[tokio::test]
async fn test_logout_in_final_second_revokes_access_token() {
    let (manager, store) = manager();
    let next_second = Utc.timestamp_opt(Utc::now().timestamp() + 1, 0).unwrap();
    let issued_at = next_second - manager.creator().config().access_token_ttl;

    // Expires on the next whole-second boundary, so less than a second remains
    let access = manager
        .creator()
        .create_at(&principal(), TokenKind::Access, issued_at)
        .unwrap();
    assert_eq!(access.expires_at, next_second);

    manager.logout(Some(&access.token), None).await;

    assert!(manager.is_access_revoked(&access.token).await);
    assert!(!manager.validate(&access.token, TokenKind::Access).await.is_valid());
    if Utc::now() < access.expires_at {
        assert!(store.is_access_blacklisted(&access.jti).await.unwrap());
    }
}

#[tokio::test]
async fn test_logout_handles_each_token_independently() {
    let (manager, store) = manager();
    let pair = manager.issue_tokens(&principal()).await.unwrap();
    let refresh_jti = jti(&manager, &pair.refresh_token, TokenKind::Refresh);

    // Invalid access token does not prevent the refresh token from being revoked
    manager.logout(Some("garbage"), Some(&pair.refresh_token)).await;
    assert!(!store.is_refresh_whitelisted(&refresh_jti).await.unwrap());
    assert!(!manager.is_access_revoked(&pair.access_token).await);

    // And the other way round
    manager.logout(Some(&pair.access_token), Some("garbage")).await;
    assert!(manager.is_access_revoked(&pair.access_token).await);

    manager.logout(None, None).await;
}

#[tokio::test]
async fn test_logout_swapped_tokens_revokes_nothing() {
    let (manager, store) = manager();
    let pair = manager.issue_tokens(&principal()).await.unwrap();
    let refresh_jti = jti(&manager, &pair.refresh_token, TokenKind::Refresh);

    manager
        .logout(Some(&pair.refresh_token), Some(&pair.access_token))
        .await;

    assert!(!manager.is_access_revoked(&pair.access_token).await);
    assert!(store.is_refresh_whitelisted(&refresh_jti).await.unwrap());
}

#[tokio::test]
async fn test_is_access_revoked_for_invalid_tokens() {
    let (manager, _store) = manager();
    let pair = manager.issue_tokens(&principal()).await.unwrap();

    assert!(manager.is_access_revoked("garbage").await);
    assert!(manager.is_access_revoked(&pair.refresh_token).await);
}

#[tokio::test]
async fn test_issue_fails_when_store_unavailable() {
    let manager = TokenManager::new(keys(), Arc::new(UnavailableStore), config()).unwrap();

    let error = manager.issue_tokens(&principal()).await.unwrap_err();
    assert!(matches!(error, DomainError::Token(TokenError::StoreUnavailable { .. })));
    assert_eq!(error.status_code(), 503);
}

#[tokio::test]
async fn test_logout_absorbs_store_failures() {
    let manager = TokenManager::new(keys(), Arc::new(UnavailableStore), config()).unwrap();
    let access = manager.creator().create(&principal(), TokenKind::Access).unwrap();
    let refresh = manager.creator().create(&principal(), TokenKind::Refresh).unwrap();

    manager.logout(Some(&access.token), Some(&refresh.token)).await;
}

#[tokio::test(start_paused = true)]
async fn test_rotation_times_out_against_hanging_store() {
    let manager = TokenManager::new(keys(), Arc::new(HangingStore), config()).unwrap();
    let refresh = manager.creator().create(&principal(), TokenKind::Refresh).unwrap();

    let error = manager.rotate_refresh(&refresh.token).await.unwrap_err();
    assert!(matches!(error, DomainError::Token(TokenError::StoreUnavailable { .. })));
}

#[tokio::test]
async fn test_works_behind_a_trait_object() {
    let store: Arc<dyn RevocationStore> = Arc::new(InMemoryRevocationStore::new());
    let manager: TokenManager<dyn RevocationStore> =
        TokenManager::new(keys(), store, config()).unwrap();

    let pair = manager.issue_tokens(&principal()).await.unwrap();
    assert!(manager.rotate_refresh(&pair.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_concrete_scenario() {
    let (manager, store) = manager();
    let principal = Principal::new("u1", "a@example.com", ["USER"]);

    let pair = manager.issue_tokens(&principal).await.unwrap();

    let claims = manager
        .validate(&pair.access_token, TokenKind::Access)
        .await
        .into_claims()
        .expect("access token should validate");
    assert_eq!(claims.sub, "u1");
    assert_eq!(claims.email, "a@example.com");
    assert_eq!(claims.roles, vec!["USER"]);
    assert_eq!(claims.authorities(), vec!["ROLE_USER"]);

    let old_refresh_jti = jti(&manager, &pair.refresh_token, TokenKind::Refresh);
    let rotated = manager.rotate_refresh(&pair.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);
    assert!(!store.is_refresh_whitelisted(&old_refresh_jti).await.unwrap());

    assert_invalid_or_used(manager.rotate_refresh(&pair.refresh_token).await);
}
