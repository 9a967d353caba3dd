//! Account registration, profile and superuser services.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AccountCommand, AccountQuery, PasswordHashError, PasswordHasher, ProfileUpdateRequest,
    SignUpRequest, SuperuserRequest, UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Error, NewPassword, PasswordDigest, PasswordValidationError, PermissionFlags,
    ProfileChanges, User, UserId, UserName,
};

/// Message returned when an e-mail address is already registered.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "user with this email already exists.";

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => duplicate_email_error(),
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn duplicate_email_error() -> Error {
    Error::invalid_field("email", "duplicate", DUPLICATE_EMAIL_MESSAGE)
}

fn password_policy_error(error: PasswordValidationError) -> Error {
    let code = match error {
        PasswordValidationError::Blank => "blank",
        PasswordValidationError::TooShort { .. } => "too_short",
    };
    Error::invalid_field("password", code, error.to_string())
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    min_password_length: usize,
}

impl<U, H> AccountService<U, H> {
    /// Create a service enforcing `min_password_length` characters.
    pub fn new(users: Arc<U>, hasher: Arc<H>, min_password_length: usize) -> Self {
        Self {
            users,
            hasher,
            min_password_length,
        }
    }
}

impl<U, H> AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    fn check_new_password(&self, raw: &str) -> Result<NewPassword, Error> {
        NewPassword::new(raw, self.min_password_length).map_err(password_policy_error)
    }

    fn hash(&self, password: &NewPassword) -> Result<PasswordDigest, Error> {
        self.hasher
            .hash(password.expose())
            .map_err(map_hash_error)
    }

    fn hash_new_password(&self, raw: &str) -> Result<PasswordDigest, Error> {
        let password = self.check_new_password(raw)?;
        self.hash(&password)
    }

    async fn register(
        &self,
        email: EmailAddress,
        name: UserName,
        password: &str,
        flags: PermissionFlags,
    ) -> Result<User, Error> {
        let password = self.check_new_password(password)?;
        // Duplicate check precedes hashing.
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?
            .is_some()
        {
            return Err(duplicate_email_error());
        }

        let digest = self.hash(&password)?;
        let user = User::new(UserId::random(), email, name, flags, digest);
        self.users
            .insert(&user)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %user.id(), staff = flags.staff, "user registered");
        Ok(user)
    }
}

#[async_trait]
impl<U, H> AccountCommand for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn sign_up(&self, request: SignUpRequest) -> Result<User, Error> {
        let SignUpRequest {
            email,
            name,
            password,
        } = request;
        self.register(email, name, password.as_str(), PermissionFlags::default())
            .await
    }

    async fn create_superuser(&self, request: SuperuserRequest) -> Result<User, Error> {
        let SuperuserRequest {
            email,
            name,
            password,
        } = request;
        self.register(email, name, password.as_str(), PermissionFlags::superuser())
            .await
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        request: ProfileUpdateRequest,
    ) -> Result<User, Error> {
        let password = request
            .password
            .as_deref()
            .map(|raw| self.hash_new_password(raw))
            .transpose()?;
        let changes = ProfileChanges {
            name: request.name,
            password,
        };

        self.users
            .update_profile(user_id, &changes)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[async_trait]
impl<U, H> AccountQuery for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
