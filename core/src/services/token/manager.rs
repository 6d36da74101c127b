//! Token lifecycle orchestration: issuance, one-time refresh rotation and logout

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::domain::entities::{Principal, TokenKind, TokenPair};
use crate::domain::value_objects::ValidationOutcome;
use crate::errors::{DomainResult, TokenError};
use crate::repositories::RevocationStore;

use super::config::TokenServiceConfig;
use super::creator::TokenCreator;
use super::key_manager::KeyProvider;
use super::store_call::bounded;
use super::validator::TokenValidator;

/// Issues, rotates and revokes token pairs
///
/// A refresh token moves from whitelisted to removed exactly once, either by
/// rotation or by logout. Rotation consumes the whitelist entry through the
/// store's atomic remove, so of two concurrent rotations of the same token
/// only one can succeed.
pub struct TokenManager<S: RevocationStore + ?Sized> {
    creator: TokenCreator,
    validator: TokenValidator<S>,
    store: Arc<S>,
    store_timeout: Duration,
}

impl<S: RevocationStore + ?Sized> TokenManager<S> {
    /// Creates a new token manager
    ///
    /// # Arguments
    ///
    /// * `keys` - Signing and verification keys
    /// * `store` - Revocation store shared with every other instance
    /// * `config` - Token configuration, checked before use
    pub fn new(
        keys: Arc<dyn KeyProvider>,
        store: Arc<S>,
        config: TokenServiceConfig,
    ) -> DomainResult<Self> {
        config.validate()?;

        Ok(Self {
            creator: TokenCreator::new(Arc::clone(&keys), config.clone()),
            validator: TokenValidator::new(keys, Arc::clone(&store), config.clone()),
            store,
            store_timeout: config.store_timeout,
        })
    }

    pub fn creator(&self) -> &TokenCreator {
        &self.creator
    }

    pub fn validator(&self) -> &TokenValidator<S> {
        &self.validator
    }

    /// Issues a fresh access/refresh pair and whitelists the refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Both tokens signed and the refresh token registered
    /// * `Err(DomainError)` - Signing failed or the store is unavailable
    pub async fn issue_tokens(&self, principal: &Principal) -> DomainResult<TokenPair> {
        let access = self.creator.create(principal, TokenKind::Access)?;
        let refresh = self.creator.create(principal, TokenKind::Refresh)?;

        bounded(
            self.store_timeout,
            "refresh whitelist",
            self.store.whitelist_refresh(&refresh.jti, refresh.expires_at),
        )
        .await
        .map_err(|e| {
            error!(sub = %principal.id, error = %e, "Failed to whitelist refresh token");
            e
        })?;

        info!(
            sub = %principal.id,
            access_jti = %access.jti,
            refresh_jti = %refresh.jti,
            "Issued token pair"
        );

        Ok(TokenPair::new(access, refresh))
    }

    /// Exchanges a whitelisted refresh token for a new pair
    ///
    /// Any rejection (bad signature, expiry, wrong kind, replay or an unknown
    /// `jti`) yields the same [`TokenError::InvalidOrUsedRefreshToken`].
    pub async fn rotate_refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = match self.validator.validate(refresh_token, TokenKind::Refresh).await {
            ValidationOutcome::Valid(claims) => claims,
            ValidationOutcome::Invalid(failure) => {
                debug!(reason = %failure, "Refresh rotation rejected");
                return Err(TokenError::InvalidOrUsedRefreshToken.into());
            }
        };

        let consumed = bounded(
            self.store_timeout,
            "refresh consume",
            self.store.remove_refresh(&claims.jti),
        )
        .await?;

        if !consumed {
            warn!(sub = %claims.sub, jti = %claims.jti, "Rejected replayed or unknown refresh token");
            return Err(TokenError::InvalidOrUsedRefreshToken.into());
        }

        debug!(sub = %claims.sub, jti = %claims.jti, "Consumed refresh token");
        self.issue_tokens(&claims.principal()).await
    }

    /// Revokes whichever of the two tokens are supplied and still valid
    ///
    /// Never fails: invalid or absent tokens are skipped and store errors are
    /// logged. Calling it repeatedly with the same tokens is harmless.
    pub async fn logout(&self, access_token: Option<&str>, refresh_token: Option<&str>) {
        if let Some(token) = access_token {
            self.revoke_access(token).await;
        }
        if let Some(token) = refresh_token {
            self.revoke_refresh(token).await;
        }
    }

    /// True when the access token fails validation or has been blacklisted
    pub async fn is_access_revoked(&self, access_token: &str) -> bool {
        !self
            .validator
            .validate(access_token, TokenKind::Access)
            .await
            .is_valid()
    }

    /// Validates a token of the expected kind
    pub async fn validate(&self, token: &str, expected_kind: TokenKind) -> ValidationOutcome {
        self.validator.validate(token, expected_kind).await
    }

    async fn revoke_access(&self, token: &str) {
        // Blacklisted tokens still verify, keeping logout idempotent
        let claims = match self.validator.verify(token, TokenKind::Access) {
            ValidationOutcome::Valid(claims) => claims,
            ValidationOutcome::Invalid(failure) => {
                debug!(reason = %failure, "Logout skipped invalid access token");
                return;
            }
        };

        let result = bounded(
            self.store_timeout,
            "access blacklist",
            self.store.blacklist_access(&claims.jti, claims.expires_at()),
        )
        .await;

        match result {
            Ok(()) => info!(sub = %claims.sub, jti = %claims.jti, "Access token revoked"),
            Err(e) => warn!(jti = %claims.jti, error = %e, "Failed to blacklist access token on logout"),
        }
    }

    async fn revoke_refresh(&self, token: &str) {
        let claims = match self.validator.verify(token, TokenKind::Refresh) {
            ValidationOutcome::Valid(claims) => claims,
            ValidationOutcome::Invalid(failure) => {
                debug!(reason = %failure, "Logout skipped invalid refresh token");
                return;
            }
        };

        let result = bounded(
            self.store_timeout,
            "refresh removal",
            self.store.remove_refresh(&claims.jti),
        )
        .await;

        match result {
            Ok(true) => info!(sub = %claims.sub, jti = %claims.jti, "Refresh token revoked"),
            Ok(false) => debug!(jti = %claims.jti, "Refresh token already consumed"),
            Err(e) => warn!(jti = %claims.jti, error = %e, "Failed to remove refresh token on logout"),
        }
    }
}
