//! Authentication and registration payloads.
//!
//! Inbound adapters parse raw strings into these types before calling the
//! account service, so the service only ever sees validated input.

use std::fmt;

use serde_json::json;
use zeroize::Zeroizing;

use super::{
    Email, Error, NewPassword, PasswordError, ProfileFields, Role, UserValidationError, Username,
    validate_name,
};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use learning_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada", "analytical").expect("valid");
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Raw self-registration form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
    pub password: String,
    pub password_confirmation: String,
}

/// Validated self-registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub email: Email,
    pub role: Role,
    pub profile: ProfileFields,
    pub password: NewPassword,
}

impl TryFrom<RegistrationForm> for Registration {
    type Error = Error;

    fn try_from(form: RegistrationForm) -> Result<Self, Self::Error> {
        let username = Username::new(form.username)?;
        let email = Email::new(form.email)?;
        let first_name = validate_name("firstName", &form.first_name)?;
        let last_name = validate_name("lastName", &form.last_name)?;
        let role = form.role.unwrap_or_default();
        if role == Role::Admin {
            return Err(Error::forbidden("the admin role cannot be self-assigned")
                .with_details(json!({ "field": "role", "code": "role_not_allowed" })));
        }
        let password = NewPassword::new(&form.password, &form.password_confirmation)
            .map_err(password_error)?;
        Ok(Self {
            username,
            email,
            role,
            profile: ProfileFields {
                first_name,
                last_name,
                bio: None,
                profile_image_url: None,
            },
            password,
        })
    }
}

/// Map password policy failures onto request errors.
pub fn password_error(err: PasswordError) -> Error {
    match err {
        PasswordError::TooShort { .. } => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "password", "code": "password_too_short" })),
        PasswordError::Mismatch => Error::invalid_request(err.to_string()).with_details(
            json!({ "field": "passwordConfirmation", "code": "password_mismatch" }),
        ),
        PasswordError::Hash { .. } | PasswordError::Malformed { .. } => {
            Error::internal(err.to_string())
        }
    }
}

/// Raw profile edit form. The username is read-only and absent here.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Validated profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Email,
    pub profile: ProfileFields,
}

impl TryFrom<ProfileUpdateForm> for ProfileUpdate {
    type Error = UserValidationError;

    fn try_from(form: ProfileUpdateForm) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::new(form.email)?,
            profile: ProfileFields {
                first_name: validate_name("firstName", &form.first_name)?,
                last_name: validate_name("lastName", &form.last_name)?,
                bio: normalise_optional(form.bio),
                profile_image_url: normalise_optional(form.profile_image_url),
            },
        })
    }
}

/// Trim an optional text field, treating blank values as absent.
pub fn normalise_optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn form() -> RegistrationForm {
        RegistrationForm {
            username: "grace".to_owned(),
            email: "Grace@Example.org".to_owned(),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
            role: Some(Role::Educator),
            password: "compiler-first".to_owned(),
            password_confirmation: "compiler-first".to_owned(),
        }
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn credentials_debug_hides_password() {
        let creds = LoginCredentials::try_from_parts("ada", "hunter22").expect("valid");
        assert!(!format!("{creds:?}").contains("hunter22"));
    }

    #[rstest]
    fn registration_normalises_fields(form: RegistrationForm) {
        let registration = Registration::try_from(form).expect("valid registration");
        assert_eq!(registration.email.as_ref(), "grace@example.org");
        assert_eq!(registration.role, Role::Educator);
        assert_eq!(registration.profile.last_name, "Hopper");
    }

    #[rstest]
    fn registration_defaults_to_citizen(mut form: RegistrationForm) {
        form.role = None;
        let registration = Registration::try_from(form).expect("valid registration");
        assert_eq!(registration.role, Role::Citizen);
    }

    #[rstest]
    fn registration_refuses_admin_role(mut form: RegistrationForm) {
        form.role = Some(Role::Admin);
        let err = Registration::try_from(form).expect_err("admin is not self-assignable");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn registration_reports_password_mismatch_field(mut form: RegistrationForm) {
        form.password_confirmation = "something-else".to_owned();
        let err = Registration::try_from(form).expect_err("mismatch");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|v| v.as_str()),
            Some("passwordConfirmation")
        );
    }

    #[rstest]
    fn profile_update_drops_blank_optionals() {
        let update = ProfileUpdate::try_from(ProfileUpdateForm {
            email: "ada@example.org".to_owned(),
            first_name: " Ada ".to_owned(),
            last_name: String::new(),
            bio: Some("   ".to_owned()),
            profile_image_url: Some("https://img.example.org/ada.png".to_owned()),
        })
        .expect("valid update");
        assert_eq!(update.profile.first_name, "Ada");
        assert!(update.profile.bio.is_none());
        assert!(update.profile.profile_image_url.is_some());
    }
}
