//! Domain layer: the principal, the signed claim set and validation results.

pub mod entities;
pub mod value_objects;

pub use entities::{Audience, Claims, IssuedToken, Principal, TokenKind, TokenPair, TOKEN_TYPE_BEARER};
pub use value_objects::{FailureCategory, ValidationFailure, ValidationOutcome, INVALID_TOKEN_MESSAGE};
