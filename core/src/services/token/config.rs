//! Configuration for the token services

use std::time::Duration as StdDuration;

use chrono::Duration;
use tg_shared::config::{JwtConfig, RevocationCheckPolicy};

use crate::domain::entities::TokenKind;
use crate::errors::DomainError;

/// Configuration shared by the creator, validator and manager
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Expected and issued `iss` claim
    pub issuer: String,
    /// Expected and issued `aud` claim
    pub audience: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// `kid` header value
    pub key_id: String,
    /// Upper bound for a single revocation store call
    pub store_timeout: StdDuration,
    /// Behaviour when the blacklist cannot be consulted
    pub revocation_check: RevocationCheckPolicy,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl: Duration::seconds(config.access_token_expiry),
            refresh_token_ttl: Duration::seconds(config.refresh_token_expiry),
            key_id: config.key_id.clone(),
            store_timeout: StdDuration::from_millis(config.store_timeout_ms),
            revocation_check: config.revocation_check,
        }
    }
}

impl TokenServiceConfig {
    /// Lifetime of a token of the given kind
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        }
    }

    /// Checks the configuration is usable
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.issuer.trim().is_empty() {
            return Err(config_error("issuer must not be empty"));
        }
        if self.audience.trim().is_empty() {
            return Err(config_error("audience must not be empty"));
        }
        if self.access_token_ttl <= Duration::zero() {
            return Err(config_error("access token TTL must be positive"));
        }
        if self.refresh_token_ttl <= self.access_token_ttl {
            return Err(config_error("refresh token TTL must exceed access token TTL"));
        }
        if self.store_timeout.is_zero() {
            return Err(config_error("store timeout must be positive"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> DomainError {
    DomainError::Validation {
        message: format!("Invalid token configuration: {}", message),
    }
}
