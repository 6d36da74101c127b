//! Storage seams of the token lifecycle

pub mod revocation;

pub use revocation::{InMemoryRevocationStore, RevocationStore};
