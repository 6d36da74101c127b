//! Token creation and signing

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, Header};

use crate::domain::entities::{Claims, IssuedToken, Principal, TokenKind};
use crate::errors::{DomainResult, TokenError};

use super::config::TokenServiceConfig;
use super::key_manager::KeyProvider;

/// Builds and signs RS256 tokens for a principal
///
/// Stateless apart from its immutable configuration; safe to share between
/// any number of concurrent callers. Creating a token has no side effect:
/// whitelisting refresh tokens is up to the caller.
pub struct TokenCreator {
    keys: Arc<dyn KeyProvider>,
    config: TokenServiceConfig,
    header: Header,
}

impl TokenCreator {
    pub fn new(keys: Arc<dyn KeyProvider>, config: TokenServiceConfig) -> Self {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(config.key_id.clone());

        Self {
            keys,
            config,
            header,
        }
    }

    /// Creates a signed token of the given kind, valid from now
    pub fn create(&self, principal: &Principal, kind: TokenKind) -> DomainResult<IssuedToken> {
        self.create_at(principal, kind, Utc::now())
    }

    /// Creates a signed token whose validity window starts at `issued_at`
    pub fn create_at(
        &self,
        principal: &Principal,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
    ) -> DomainResult<IssuedToken> {
        let claims = Claims::new(
            principal,
            kind,
            &self.config.issuer,
            &self.config.audience,
            issued_at,
            self.config.ttl(kind),
        );
        let token = self.sign(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
            jti: claims.jti,
            kind,
        })
    }

    /// Signs an arbitrary claim set with the configured key and header
    pub(crate) fn sign(&self, claims: &Claims) -> DomainResult<String> {
        encode(&self.header, claims, self.keys.private_key()).map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            TokenError::SigningFailed {
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }
}
