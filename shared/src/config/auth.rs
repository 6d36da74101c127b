//! Token signing and validation configuration

use serde::{Deserialize, Serialize};

/// Behaviour of access-token validation when the revocation store cannot be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationCheckPolicy {
    /// Reject the token: it cannot be confirmed as not revoked
    #[default]
    FailClosed,
    /// Accept the token as if it were not blacklisted
    FailOpen,
}

impl std::str::FromStr for RevocationCheckPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_closed" | "closed" => Ok(RevocationCheckPolicy::FailClosed),
            "fail_open" | "open" => Ok(RevocationCheckPolicy::FailOpen),
            _ => Err(format!("Invalid revocation check policy: {}", s)),
        }
    }
}

/// JWT configuration for RS256-signed bearer tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// Key identifier written to the `kid` header
    #[serde(default = "default_key_id")]
    pub key_id: String,

    /// Path to the PKCS#8 PEM private key
    pub private_key_path: String,

    /// Path to the SubjectPublicKeyInfo PEM public key
    pub public_key_path: String,

    /// Timeout for a single revocation store call in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// What to do when the blacklist is unreachable during validation
    #[serde(default)]
    pub revocation_check: RevocationCheckPolicy,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("tokengate"),
            audience: String::from("tokengate-api"),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800,  // 7 days
            key_id: default_key_id(),
            private_key_path: String::from("keys/jwt_private_key.pem"),
            public_key_path: String::from("keys/jwt_public_key.pem"),
            store_timeout_ms: default_store_timeout_ms(),
            revocation_check: RevocationCheckPolicy::default(),
        }
    }
}

impl JwtConfig {
    /// Create a configuration for the given issuer and audience
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_expiry: env_parse("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_parse("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            key_id: std::env::var("JWT_KEY_ID").unwrap_or(defaults.key_id),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH").unwrap_or(defaults.private_key_path),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH").unwrap_or(defaults.public_key_path),
            store_timeout_ms: env_parse("JWT_STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            revocation_check: env_parse("JWT_REVOCATION_CHECK", defaults.revocation_check),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Set the key file locations
    pub fn with_key_paths(
        mut self,
        private_key_path: impl Into<String>,
        public_key_path: impl Into<String>,
    ) -> Self {
        self.private_key_path = private_key_path.into();
        self.public_key_path = public_key_path.into();
        self
    }

    /// Set the revocation check policy
    pub fn with_revocation_check(mut self, policy: RevocationCheckPolicy) -> Self {
        self.revocation_check = policy;
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn default_key_id() -> String {
    String::from("tokengate-key-1")
}

fn default_store_timeout_ms() -> u64 {
    500
}
