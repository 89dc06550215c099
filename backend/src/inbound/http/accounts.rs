//! Registration, login and profile handlers.
//!
//! ```text
//! POST /api/v1/register {"username":"ada","email":"ada@example.org",...}
//! POST /api/v1/login {"username":"ada","password":"correct horse"}
//! POST /api/v1/logout
//! GET /api/v1/me
//! GET /api/v1/profile
//! GET /api/v1/profile/{user_id}
//! PUT /api/v1/profile
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, ProfileUpdateForm, RegistrationForm, Role,
    UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ProfileResponse, UserResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Self-registration payload. `role` may be `citizen` (default) or
/// `educator`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.org")]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Option<Role>,
    pub password: String,
    pub password_confirmation: String,
}

impl From<RegisterRequest> for RegistrationForm {
    fn from(value: RegisterRequest) -> Self {
        Self {
            username: value.username,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            role: value.role,
            password: value.password,
            password_confirmation: value.password_confirmation,
        }
    }
}

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Editable profile fields. The username cannot be changed.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

impl From<ProfileUpdateRequest> for ProfileUpdateForm {
    fn from(value: ProfileUpdateRequest) -> Self {
        Self {
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            bio: value.bio,
            profile_image_url: value.profile_image_url,
        }
    }
}

/// Create an account. Registration does not sign the user in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.accounts.register(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.accounts.login(credentials).await?;
    session.persist_user(&user.id)?;
    Ok(web::Json(user.into()))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// The signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user = session.require_user(&state).await?;
    Ok(web::Json(user.into()))
}

/// The signed-in user's own profile with role statistics.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Own profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "ownProfile"
)]
#[get("/profile")]
pub async fn own_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let viewer = session.require_user(&state).await?;
    let view = state.accounts.profile(&viewer, None).await?;
    Ok(web::Json(view.into()))
}

/// Another user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/profile/{user_id}",
    params(("user_id" = Uuid, Path, description = "Profile owner")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "userProfile"
)]
#[get("/profile/{user_id}")]
pub async fn user_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let viewer = session.require_user(&state).await?;
    let subject = UserId::from_uuid(path.into_inner());
    let view = state.accounts.profile(&viewer, Some(subject)).await?;
    Ok(web::Json(view.into()))
}

/// Update the signed-in user's profile.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = session.require_user(&state).await?;
    let user = state
        .accounts
        .update_profile(&actor, payload.into_inner().into())
        .await?;
    Ok(web::Json(user.into()))
}
