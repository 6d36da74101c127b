//! Result of validating a presented token
//!
//! Validation never fails as an error: every rejection is a
//! [`ValidationFailure`] carried inside a [`ValidationOutcome`]. The internal
//! reason is kept for logging, while [`ValidationFailure::public_message`]
//! is the only text meant for the caller's response.

use thiserror::Error;

use crate::domain::entities::{Claims, TokenKind};

/// Generic message returned to clients for any rejected token
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";

/// Coarse classification of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// Empty or malformed token, unparseable claims
    Structural,
    /// Signature does not verify
    Cryptographic,
    /// Not yet valid or expired
    Temporal,
    /// Wrong issuer, audience or kind
    Semantic,
    /// Blacklisted, or the blacklist could not be consulted
    Revocation,
}

/// Internal reason a token was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("Token is empty")]
    EmptyToken,

    #[error("Malformed token: {detail}")]
    Malformed { detail: String },

    #[error("Signature verification failed")]
    InvalidSignature,

    #[error("Invalid claims: {detail}")]
    InvalidClaims { detail: String },

    #[error("Issuer mismatch")]
    IssuerMismatch,

    #[error("Audience mismatch")]
    AudienceMismatch,

    #[error("Token not yet valid")]
    NotYetValid,

    #[error("Token expired")]
    Expired,

    #[error("Wrong token kind: expected {expected}, got {actual}")]
    KindMismatch {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("Token revoked")]
    Revoked,

    #[error("Revocation status unavailable")]
    RevocationUnavailable,
}

impl ValidationFailure {
    /// Category used for logging and metrics
    pub fn category(&self) -> FailureCategory {
        match self {
            ValidationFailure::EmptyToken
            | ValidationFailure::Malformed { .. }
            | ValidationFailure::InvalidClaims { .. } => FailureCategory::Structural,
            ValidationFailure::InvalidSignature => FailureCategory::Cryptographic,
            ValidationFailure::NotYetValid | ValidationFailure::Expired => FailureCategory::Temporal,
            ValidationFailure::IssuerMismatch
            | ValidationFailure::AudienceMismatch
            | ValidationFailure::KindMismatch { .. } => FailureCategory::Semantic,
            ValidationFailure::Revoked | ValidationFailure::RevocationUnavailable => {
                FailureCategory::Revocation
            }
        }
    }

    /// Message safe to return to a client. Identical for every failure.
    pub fn public_message(&self) -> &'static str {
        INVALID_TOKEN_MESSAGE
    }
}

/// Outcome of validating a token: claims on success, a reason on failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(Claims),
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    /// Borrow the claims of a successful validation
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            ValidationOutcome::Valid(claims) => Some(claims),
            ValidationOutcome::Invalid(_) => None,
        }
    }

    pub fn into_claims(self) -> Option<Claims> {
        match self {
            ValidationOutcome::Valid(claims) => Some(claims),
            ValidationOutcome::Invalid(_) => None,
        }
    }

    /// Borrow the failure of a rejected validation
    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            ValidationOutcome::Valid(_) => None,
            ValidationOutcome::Invalid(failure) => Some(failure),
        }
    }

    /// Internal reason string, `None` on success
    pub fn reason(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }

    pub fn into_result(self) -> Result<Claims, ValidationFailure> {
        match self {
            ValidationOutcome::Valid(claims) => Ok(claims),
            ValidationOutcome::Invalid(failure) => Err(failure),
        }
    }
}

impl From<Result<Claims, ValidationFailure>> for ValidationOutcome {
    fn from(result: Result<Claims, ValidationFailure>) -> Self {
        match result {
            Ok(claims) => ValidationOutcome::Valid(claims),
            Err(failure) => ValidationOutcome::Invalid(failure),
        }
    }
}
