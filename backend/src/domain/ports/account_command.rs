//! Driving ports for account registration and self-service profile changes.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{EmailAddress, Error, User, UserId, UserName};

/// Sign-up payload after field-level validation.
///
/// The password is still plaintext; the service applies the length policy and
/// hashes it.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: EmailAddress,
    pub name: UserName,
    pub password: Zeroizing<String>,
}

/// Administrative account request used by the superuser command.
#[derive(Debug, Clone)]
pub struct SuperuserRequest {
    pub email: EmailAddress,
    pub name: UserName,
    pub password: Zeroizing<String>,
}

/// Profile update payload; absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateRequest {
    pub name: Option<UserName>,
    pub password: Option<Zeroizing<String>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Register a regular user.
    async fn sign_up(&self, request: SignUpRequest) -> Result<User, Error>;

    /// Register a user with staff and superuser flags.
    async fn create_superuser(&self, request: SuperuserRequest) -> Result<User, Error>;

    /// Update the caller's own profile.
    async fn update_profile(
        &self,
        user_id: &UserId,
        request: ProfileUpdateRequest,
    ) -> Result<User, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Read the caller's own profile.
    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;
}
