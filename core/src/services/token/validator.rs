//! Token validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! non-empty input, compact structure, signature, claims, issuer, audience,
//! not-before, expiry, kind and, for access tokens only, the blacklist.
//! Every failure is returned as a [`ValidationOutcome`], never as an error.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use tg_shared::config::RevocationCheckPolicy;
use tracing::{debug, warn};

use crate::domain::entities::{Claims, TokenKind};
use crate::domain::value_objects::{ValidationFailure, ValidationOutcome};
use crate::repositories::RevocationStore;

use super::config::TokenServiceConfig;
use super::key_manager::KeyProvider;
use super::store_call::bounded;

/// Validates presented tokens against the public key, the configured
/// issuer and audience, and the revocation store
pub struct TokenValidator<S: RevocationStore + ?Sized> {
    keys: Arc<dyn KeyProvider>,
    store: Arc<S>,
    config: TokenServiceConfig,
    validation: Validation,
}

impl<S: RevocationStore + ?Sized> TokenValidator<S> {
    pub fn new(keys: Arc<dyn KeyProvider>, store: Arc<S>, config: TokenServiceConfig) -> Self {
        // Signature and algorithm only; every claim check is done explicitly
        // so each failure keeps its own reason.
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            keys,
            store,
            config,
            validation,
        }
    }

    /// Full validation, including the blacklist lookup for access tokens
    pub async fn validate(&self, token: &str, expected_kind: TokenKind) -> ValidationOutcome {
        self.validate_at(token, expected_kind, Utc::now()).await
    }

    /// Full validation against an explicit clock
    pub async fn validate_at(
        &self,
        token: &str,
        expected_kind: TokenKind,
        now: DateTime<Utc>,
    ) -> ValidationOutcome {
        let claims = match self.verify_at(token, expected_kind, now) {
            ValidationOutcome::Valid(claims) => claims,
            invalid => return invalid,
        };

        if expected_kind == TokenKind::Refresh {
            return ValidationOutcome::Valid(claims);
        }

        let lookup = bounded(
            self.config.store_timeout,
            "blacklist lookup",
            self.store.is_access_blacklisted(&claims.jti),
        )
        .await;

        match lookup {
            Ok(false) => ValidationOutcome::Valid(claims),
            Ok(true) => reject(ValidationFailure::Revoked),
            Err(e) => match self.config.revocation_check {
                RevocationCheckPolicy::FailClosed => {
                    warn!(jti = %claims.jti, error = %e, "Blacklist unavailable, rejecting access token");
                    reject(ValidationFailure::RevocationUnavailable)
                }
                RevocationCheckPolicy::FailOpen => {
                    warn!(jti = %claims.jti, error = %e, "Blacklist unavailable, accepting access token");
                    ValidationOutcome::Valid(claims)
                }
            },
        }
    }

    /// Stateless validation: every check except the blacklist lookup
    pub fn verify(&self, token: &str, expected_kind: TokenKind) -> ValidationOutcome {
        self.verify_at(token, expected_kind, Utc::now())
    }

    /// Stateless validation against an explicit clock
    pub fn verify_at(
        &self,
        token: &str,
        expected_kind: TokenKind,
        now: DateTime<Utc>,
    ) -> ValidationOutcome {
        match self.check(token, expected_kind, now) {
            Ok(claims) => ValidationOutcome::Valid(claims),
            Err(failure) => reject(failure),
        }
    }

    fn check(
        &self,
        token: &str,
        expected_kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, ValidationFailure> {
        if token.is_empty() {
            return Err(ValidationFailure::EmptyToken);
        }

        check_structure(token)?;

        let claims = decode::<Claims>(token, self.keys.public_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::InvalidRsaKey(_)
                | ErrorKind::InvalidKeyFormat
                | ErrorKind::Crypto(_) => ValidationFailure::InvalidSignature,
                ErrorKind::Json(_) | ErrorKind::Utf8(_) => ValidationFailure::InvalidClaims {
                    detail: e.to_string(),
                },
                _ => ValidationFailure::Malformed {
                    detail: e.to_string(),
                },
            })?;

        if claims.iss != self.config.issuer {
            return Err(ValidationFailure::IssuerMismatch);
        }
        if !claims.aud.contains(&self.config.audience) {
            return Err(ValidationFailure::AudienceMismatch);
        }
        if claims.is_premature_at(now) {
            return Err(ValidationFailure::NotYetValid);
        }
        if claims.is_expired_at(now) {
            return Err(ValidationFailure::Expired);
        }
        if claims.kind != expected_kind {
            return Err(ValidationFailure::KindMismatch {
                expected: expected_kind,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }
}

/// Three non-empty base64url segments with a parseable JWS header
fn check_structure(token: &str) -> Result<(), ValidationFailure> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ValidationFailure::Malformed {
            detail: format!("expected 3 segments, found {}", segments.len()),
        });
    }

    for (name, segment) in ["header", "claims", "signature"].iter().zip(&segments) {
        if segment.is_empty() {
            return Err(ValidationFailure::Malformed {
                detail: format!("empty {} segment", name),
            });
        }
        URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| ValidationFailure::Malformed {
                detail: format!("{} segment is not base64url: {}", name, e),
            })?;
    }

    decode_header(token).map_err(|e| ValidationFailure::Malformed {
        detail: format!("unreadable header: {}", e),
    })?;

    Ok(())
}

fn reject(failure: ValidationFailure) -> ValidationOutcome {
    debug!(reason = %failure, category = ?failure.category(), "Token validation failed");
    ValidationOutcome::Invalid(failure)
}
