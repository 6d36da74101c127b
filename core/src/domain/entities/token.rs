//! Token entities for JWT-based bearer authentication.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Principal;

/// Value of `TokenPair::token_type`
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Kind of token, serialized into the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token presented on every protected request
    Access,
    /// Long-lived, one-time-use token exchanged for a new pair
    Refresh,
}

impl TokenKind {
    /// The literal claim value
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            other => Err(format!("Unknown token kind: {}", other)),
        }
    }
}

/// The `aud` claim. Issued as a single string; a list is accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    /// Checks whether the audience contains the given value (exact match)
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(value) => value == audience,
            Audience::Multiple(values) => values.iter().any(|v| v == audience),
        }
    }
}

impl From<&str> for Audience {
    fn from(value: &str) -> Self {
        Audience::Single(value.to_string())
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal id)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: Audience,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID, the revocation handle
    pub jti: String,

    /// Token kind
    #[serde(rename = "typ")]
    pub kind: TokenKind,

    /// Principal email
    pub email: String,

    /// Principal roles, order preserved
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    /// Builds the claim set for a principal
    ///
    /// `iat` and `nbf` are both `issued_at`; `exp` is `issued_at + ttl`.
    /// A fresh random `jti` is generated for every call.
    pub fn new(
        principal: &Principal,
        kind: TokenKind,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expires_at = issued_at + ttl;

        Self {
            sub: principal.id.clone(),
            iss: issuer.to_string(),
            aud: Audience::from(audience),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            kind,
            email: principal.email.clone(),
            roles: principal.roles.clone(),
        }
    }

    /// Re-derives the principal embedded in the claims
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
        }
    }

    /// Absolute expiry instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.exp)
    }

    /// Absolute not-before instant
    pub fn not_before(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.nbf)
    }

    /// Checks if the claims have expired at `now`
    ///
    /// Compared at full precision: the token is live strictly before `exp`,
    /// the same window in which a revocation entry for it stays live.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Checks if the claims are not yet active at `now`
    pub fn is_premature_at(&self, now: DateTime<Utc>) -> bool {
        now < self.not_before()
    }

    /// Role names mapped to `ROLE_<UPPERCASE>` authorities
    pub fn authorities(&self) -> Vec<String> {
        self.roles
            .iter()
            .map(|role| format!("ROLE_{}", role.to_uppercase()))
            .collect()
    }
}

fn timestamp_to_datetime(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A freshly signed token as produced by the creator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact serialized JWT
    pub token: String,

    /// JWT ID
    pub jti: String,

    /// Token kind
    pub kind: TokenKind,

    /// Absolute expiry
    pub expires_at: DateTime<Utc>,
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token expiry
    pub access_expires_at: DateTime<Utc>,

    /// Refresh token expiry
    pub refresh_expires_at: DateTime<Utc>,

    /// Always `Bearer`
    pub token_type: String,
}

impl TokenPair {
    /// Creates a new token pair from two issued tokens
    pub fn new(access: IssuedToken, refresh: IssuedToken) -> Self {
        Self {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }

    /// Seconds until the access token expires, zero once elapsed
    pub fn access_expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.access_expires_at - now).num_seconds().max(0)
    }

    /// Seconds until the refresh token expires, zero once elapsed
    pub fn refresh_expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.refresh_expires_at - now).num_seconds().max(0)
    }
}
