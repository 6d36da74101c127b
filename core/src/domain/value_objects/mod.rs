//! Value objects representing immutable domain concepts.

pub mod validation;

pub use validation::{FailureCategory, ValidationFailure, ValidationOutcome, INVALID_TOKEN_MESSAGE};
