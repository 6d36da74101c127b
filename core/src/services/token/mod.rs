//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - RS256 key loading behind the `KeyProvider` seam
//! - Access and refresh token creation
//! - Validation with structured outcomes
//! - One-time refresh rotation and logout revocation

mod bearer;
mod config;
mod creator;
mod key_manager;
mod manager;
mod store_call;
mod validator;

#[cfg(test)]
mod tests;

pub use bearer::extract_bearer_token;
pub use config::TokenServiceConfig;
pub use creator::TokenCreator;
pub use key_manager::{KeyProvider, Rs256KeyManager, MIN_RSA_KEY_BITS};
pub use manager::TokenManager;
pub use validator::TokenValidator;
