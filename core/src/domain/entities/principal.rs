//! The authenticated subject tokens are issued for.

use serde::{Deserialize, Serialize};

/// An authenticated principal as handed over by the credential-checking layer
///
/// The core never looks principals up; everything needed downstream is
/// denormalized into the token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque subject identifier
    pub id: String,

    /// Email-like label
    pub email: String,

    /// Role names, order preserved
    pub roles: Vec<String>,
}

impl Principal {
    /// Creates a new principal
    pub fn new<I, R>(id: impl Into<String>, email: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            id: id.into(),
            email: email.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks whether the principal carries a role (case-insensitive)
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}
