//! Domain entities representing the token lifecycle.

pub mod principal;
pub mod token;

pub use principal::Principal;
pub use token::{Audience, Claims, IssuedToken, TokenKind, TokenPair, TOKEN_TYPE_BEARER};
