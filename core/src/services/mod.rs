//! Token lifecycle services.

pub mod token;

// Re-export commonly used types
pub use token::{
    extract_bearer_token, KeyProvider, Rs256KeyManager, TokenCreator, TokenManager,
    TokenServiceConfig, TokenValidator,
};
