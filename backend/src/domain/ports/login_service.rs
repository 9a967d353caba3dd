//! Driving ports for token issuance and token authentication.
//!
//! Inbound adapters call these without knowing how tokens are stored, which
//! keeps handler tests free of persistence wiring.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials, UserId};

/// Exchange credentials for a fresh API token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return a newly issued token.
    ///
    /// Unknown e-mail, wrong password and inactive accounts all fail with the
    /// same `invalid_request` error.
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;
}

/// Resolve the caller behind a presented token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    /// Returns the owning user id or an `unauthorized` error.
    async fn authenticate(&self, token: &AuthToken) -> Result<UserId, Error>;
}
