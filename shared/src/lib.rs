//! Shared configuration types for the Tokengate workspace
//!
//! Every crate reads its settings through these types so the token services,
//! the Redis store and logging agree on one set of environment variables.

pub mod config;

pub use config::{
    AppConfig, CacheConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
    RevocationCheckPolicy,
};
