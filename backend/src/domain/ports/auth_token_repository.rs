//! Port for API token storage.
//!
//! Adapters only ever see token digests; the plaintext key leaves the system
//! once, in the token endpoint response. Each user holds at most one token.

use async_trait::async_trait;

use crate::domain::{TokenDigest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token repository adapters.
    pub enum AuthTokenPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Make `digest` the only valid token for `owner`, revoking any earlier one.
    async fn rotate(
        &self,
        owner: &UserId,
        digest: &TokenDigest,
    ) -> Result<(), AuthTokenPersistenceError>;

    /// Resolve the owner of a token digest.
    async fn find_owner(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, AuthTokenPersistenceError>;
}
