//! Acting User
//!
//! Stores only need to know who is acting before they touch the backend.
//! Sign-in, sign-up and multi-factor flows live with the auth provider.

use serde::{Deserialize, Serialize};

pub type UserId = String;

pub trait AuthProvider {
    /// Id of the signed-in user, if any
    fn current_user(&self) -> Option<UserId>;

    /// Bearer token for backend calls made on the user's behalf
    fn access_token(&self) -> Option<String> {
        None
    }
}

/// An established session as handed over by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub access_token: String,
}

impl AuthProvider for Session {
    fn current_user(&self) -> Option<UserId> {
        Some(self.user_id.clone())
    }

    fn access_token(&self) -> Option<String> {
        Some(self.access_token.clone())
    }
}

/// Fixed identity (or none)
#[derive(Debug, Clone, Default)]
pub struct StaticAuth(pub Option<UserId>);

impl StaticAuth {
    pub fn user(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn signed_out() -> Self {
        Self(None)
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}
