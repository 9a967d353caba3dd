//! User identity model.
//!
//! Users authenticate by e-mail address. Each value type validates its own
//! invariants so persistence adapters and handlers only ever see normalised
//! data.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

/// Maximum length, in characters, of an e-mail address or user name.
pub const USER_FIELD_MAX: usize = 255;

/// Validation errors returned by the user value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "This field may not be blank."),
            Self::InvalidEmail => write!(f, "Enter a valid email address."),
            Self::EmailTooLong { max } | Self::NameTooLong { max } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
            Self::EmptyName => write!(f, "This field may not be blank."),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self::from(parsed))
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value, value.to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Login identifier for a user.
///
/// ## Invariants
/// - Surrounding whitespace is removed.
/// - The domain part is lower-cased; the local part keeps its case.
///
/// # Examples
/// ```
/// use backend::domain::EmailAddress;
///
/// let email = EmailAddress::new(" Ada@EXAMPLE.com ").expect("valid email");
/// assert_eq!(email.as_ref(), "Ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an e-mail address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::EmailTooLong {
                max: USER_FIELD_MAX,
            });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        let (local, domain) = trimmed
            .rsplit_once('@')
            .ok_or(UserValidationError::InvalidEmail)?;
        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Human readable name attached to a user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Validate a user name; surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_FIELD_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

/// Account permission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionFlags {
    pub active: bool,
    pub staff: bool,
    pub superuser: bool,
}

impl PermissionFlags {
    /// Flags granted to administrative accounts.
    pub const fn superuser() -> Self {
        Self {
            active: true,
            staff: true,
            superuser: true,
        }
    }
}

impl Default for PermissionFlags {
    fn default() -> Self {
        Self {
            active: true,
            staff: false,
            superuser: false,
        }
    }
}

/// Opaque password hash in PHC string format.
///
/// The digest is never serialised into API payloads.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an encoded hash produced by a [`crate::domain::ports::PasswordHasher`].
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Registered account.
///
/// ## Invariants
/// - `email` is unique across all users.
/// - `password` always holds a hash, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    name: UserName,
    flags: PermissionFlags,
    password: PasswordDigest,
}

impl User {
    /// Assemble a user from validated components.
    pub fn new(
        id: UserId,
        email: EmailAddress,
        name: UserName,
        flags: PermissionFlags,
        password: PasswordDigest,
    ) -> Self {
        Self {
            id,
            email,
            name,
            flags,
            password,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn flags(&self) -> PermissionFlags {
        self.flags
    }

    pub fn password(&self) -> &PasswordDigest {
        &self.password
    }

    /// Whether the account may authenticate.
    pub fn is_active(&self) -> bool {
        self.flags.active
    }
}

/// Partial update applied to the caller's own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<UserName>,
    pub password: Option<PasswordDigest>,
}
