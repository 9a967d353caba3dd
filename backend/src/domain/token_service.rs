//! Token issuance and token authentication.
//!
//! Each successful login issues a new random key and revokes the previous
//! one; only the current key's digest is stored.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::account_service::{map_hash_error, map_user_persistence_error};
use crate::domain::ports::{
    AuthTokenPersistenceError, AuthTokenRepository, LoginService, PasswordHasher,
    TokenAuthenticator, UserRepository,
};
use crate::domain::{AuthToken, EmailAddress, Error, LoginCredentials, User, UserId};

/// Message returned for every rejected login.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Unable to authenticate with provided credentials.";

fn map_token_error(error: AuthTokenPersistenceError) -> Error {
    match error {
        AuthTokenPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("token repository unavailable: {message}"))
        }
        AuthTokenPersistenceError::Query { message } => {
            Error::internal(format!("token repository error: {message}"))
        }
    }
}

fn invalid_credentials() -> Error {
    Error::invalid_field("non_field_errors", "authorization", INVALID_CREDENTIALS_MESSAGE)
}

/// Service implementing [`LoginService`] and [`TokenAuthenticator`].
#[derive(Clone)]
pub struct TokenService<U, T, H> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
}

impl<U, T, H> TokenService<U, T, H> {
    pub fn new(users: Arc<U>, tokens: Arc<T>, hasher: Arc<H>) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }
}

impl<U, T, H> TokenService<U, T, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn verified_user(&self, credentials: &LoginCredentials) -> Result<Option<User>, Error> {
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            return Ok(None);
        };
        let Some(user) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?
        else {
            return Ok(None);
        };
        let matches = self
            .hasher
            .verify(credentials.password(), user.password())
            .map_err(map_hash_error)?;
        Ok((matches && user.is_active()).then_some(user))
    }
}

#[async_trait]
impl<U, T, H> LoginService for TokenService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: PasswordHasher,
{
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let Some(user) = self.verified_user(credentials).await? else {
            debug!("login rejected");
            return Err(invalid_credentials());
        };

        let token = AuthToken::generate();
        self.tokens
            .rotate(user.id(), &token.digest())
            .await
            .map_err(map_token_error)?;
        debug!(user_id = %user.id(), "token issued");
        Ok(token)
    }
}

#[async_trait]
impl<U, T, H> TokenAuthenticator for TokenService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, token: &AuthToken) -> Result<UserId, Error> {
        let Some(owner) = self
            .tokens
            .find_owner(&token.digest())
            .await
            .map_err(map_token_error)?
        else {
            warn!("unknown API token presented");
            return Err(Error::unauthorized("Invalid token."));
        };

        match self
            .users
            .find_by_id(&owner)
            .await
            .map_err(map_user_persistence_error)?
        {
            Some(user) if user.is_active() => Ok(owner),
            _ => {
                warn!(user_id = %owner, "token presented for inactive or deleted user");
                Err(Error::unauthorized("User inactive or deleted."))
            }
        }
    }
}
