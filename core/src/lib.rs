//! # Tokengate Core
//!
//! Token lifecycle for bearer authentication: RS256 key provisioning, token
//! creation, validation, one-time refresh rotation and revocation.
//! The revocation store is reached only through the [`RevocationStore`]
//! trait; the Redis implementation lives in `tg_infra`.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::*;
pub use services::*;
pub use repositories::*;
pub use errors::*;
