//! Authentication primitives: login credentials, passwords and API tokens.
//!
//! Plaintext secrets are held in [`Zeroizing`] buffers so they are wiped once
//! the request that carried them is finished.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Number of random bytes behind an API token key.
const TOKEN_BYTES: usize = 20;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// E-mail was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail | Self::EmptyPassword => write!(f, "This field may not be blank."),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the token service.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "pw").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw e-mail/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised when a new password does not satisfy the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordValidationError {
    Blank,
    TooShort { min: usize },
}

impl fmt::Display for PasswordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "This field may not be blank."),
            Self::TooShort { min } => {
                write!(f, "Ensure this field has at least {min} characters.")
            }
        }
    }
}

impl std::error::Error for PasswordValidationError {}

/// Plaintext password accepted for storage.
///
/// Length is counted in characters and the minimum is supplied by
/// configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate `raw` against the minimum length policy.
    pub fn new(raw: &str, min_length: usize) -> Result<Self, PasswordValidationError> {
        if raw.is_empty() {
            return Err(PasswordValidationError::Blank);
        }
        if raw.chars().count() < min_length {
            return Err(PasswordValidationError::TooShort { min: min_length });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(<redacted>)")
    }
}

/// API token key handed to clients exactly once.
///
/// # Examples
/// ```
/// use backend::domain::AuthToken;
///
/// let token = AuthToken::generate();
/// assert_eq!(token.as_str().len(), 40);
/// assert_eq!(token.digest(), AuthToken::from_presented(token.as_str()).unwrap().digest());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Generate a random 40 character hexadecimal key.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(Zeroizing::new(hex::encode(bytes)))
    }

    /// Wrap a key presented by a client; blank keys are rejected.
    pub fn from_presented(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(Zeroizing::new(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Digest stored at rest in place of the key.
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of an [`AuthToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Rehydrate a digest read from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
