//! Cache module for Redis-based storage
//!
//! Provides the Redis client with retry logic and the revocation store
//! built on top of it.

pub mod redis_client;
pub mod revocation_store;


pub use redis_client::RedisClient;
pub use revocation_store::RedisRevocationStore;

// Re-export commonly used types
pub use tg_shared::config::CacheConfig;
