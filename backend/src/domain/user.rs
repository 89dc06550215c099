//! User accounts, roles and profile fields.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Error;

/// Maximum length of usernames and name fields.
pub const NAME_MAX: usize = 150;
/// Maximum length of an e-mail address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors raised by user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    #[error("username may only contain letters, digits and @/./+/-/_")]
    UsernameInvalidCharacters,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("email must look like name@domain")]
    InvalidEmail,
    #[error("{field} must be at most {max} characters")]
    NameTooLong { field: &'static str, max: usize },
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

impl UserValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyUsername | Self::UsernameTooLong { .. } | Self::UsernameInvalidCharacters => {
                "username"
            }
            Self::EmptyEmail | Self::EmailTooLong { .. } | Self::InvalidEmail => "email",
            Self::NameTooLong { field, .. } => *field,
            Self::UnknownRole(_) => "role",
        }
    }
}

impl From<UserValidationError> for Error {
    fn from(value: UserValidationError) -> Self {
        Error::invalid_request(value.to_string())
            .with_details(serde_json::json!({ "field": value.field(), "code": "invalid_user_field" }))
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new(r"^[\w.@+-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Login name; unique across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: NAME_MAX });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact address, stored lower-cased; unique across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an e-mail address.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let normalised = value.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || normalised.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role; drives every authorisation decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator with moderation rights.
    Admin,
    /// Authors modules and quizzes.
    Educator,
    /// Learner; takes quizzes.
    #[default]
    Citizen,
}

impl Role {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Educator => "educator",
            Self::Citizen => "citizen",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "educator" => Ok(Self::Educator),
            "citizen" => Ok(Self::Citizen),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Validate an optional free-text name field.
pub fn validate_name(field: &'static str, value: &str) -> Result<String, UserValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > NAME_MAX {
        return Err(UserValidationError::NameTooLong {
            field,
            max: NAME_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    /// Given name; may be empty.
    pub first_name: String,
    /// Family name; may be empty.
    pub last_name: String,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Avatar location.
    pub profile_image_url: Option<String>,
}

/// Application user.
///
/// ## Invariants
/// - `username` and `email` are unique across users (enforced by repositories).
/// - The password hash never leaves the domain; see [`super::PasswordHash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Contact address.
    pub email: Email,
    /// Role.
    pub role: Role,
    /// Profile fields.
    pub profile: ProfileFields,
    /// Whether the address has been confirmed.
    pub is_email_verified: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user administers the platform.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the user authors content.
    pub fn is_educator(&self) -> bool {
        self.role == Role::Educator
    }

    /// Whether the user is a learner.
    pub fn is_citizen(&self) -> bool {
        self.role == Role::Citizen
    }

    /// Full name, falling back to the username when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.profile.first_name, self.profile.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.to_string()
        } else {
            full.to_owned()
        }
    }

    /// Fail with `403` unless the user holds `role`.
    pub fn require_role(&self, role: Role, action: &str) -> Result<(), Error> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::forbidden(format!("only {role}s may {action}")))
        }
    }

    /// Fail with `403` unless the user is an admin.
    pub fn require_admin(&self) -> Result<(), Error> {
        self.require_role(Role::Admin, "perform administration")
    }

    /// Whether the user may edit content owned by `owner`.
    pub fn can_manage(&self, owner: Option<&UserId>) -> bool {
        self.is_admin() || owner == Some(&self.id)
    }
}
