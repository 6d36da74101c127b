//! Domain-specific error types.
//!
//! Validation of a presented token never produces one of these errors; it
//! returns a [`ValidationOutcome`](crate::domain::value_objects::ValidationOutcome).
//! The types here cover operations that can genuinely fail: startup key
//! loading, signing, rotation and store access.

use thiserror::Error;

/// Token lifecycle errors
#[derive(Error, Debug)]
pub enum TokenError {
    /// Rotation rejected. Deliberately covers every cause (bad signature,
    /// expiry, wrong kind, replay, unknown jti) so callers cannot tell them apart.
    #[error("Invalid or already used refresh token")]
    InvalidOrUsedRefreshToken,

    #[error("Token signing failed: {message}")]
    SigningFailed { message: String },

    #[error("Revocation store unavailable: {message}")]
    StoreUnavailable { message: String },
}

/// Key material errors raised while loading the signing key pair
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Failed to read {kind} key from {path}: {message}")]
    Unreadable {
        kind: &'static str,
        path: String,
        message: String,
    },

    #[error("Invalid PEM structure: {message}")]
    InvalidPem { message: String },

    #[error("Unsupported {kind} key encoding, expected {expected}")]
    UnsupportedEncoding {
        kind: &'static str,
        expected: &'static str,
    },

    #[error("RSA key too short: {bits} bits (minimum {min_bits})")]
    KeyTooShort { bits: usize, min_bits: usize },

    #[error("Public key does not match private key")]
    KeyPairMismatch,
}

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl DomainError {
    /// HTTP status the surrounding application should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Token(TokenError::InvalidOrUsedRefreshToken) => 401,
            DomainError::Token(TokenError::StoreUnavailable { .. }) => 503,
            DomainError::Validation { .. } => 400,
            DomainError::Token(TokenError::SigningFailed { .. }) | DomainError::Key(_) => 500,
        }
    }

    /// Whether this error is caused by the caller's credentials rather than the server
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == 401
    }

    pub(crate) fn store(message: impl Into<String>) -> Self {
        DomainError::Token(TokenError::StoreUnavailable {
            message: message.into(),
        })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
