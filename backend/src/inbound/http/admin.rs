//! Admin-only user management and forum moderation.
//!
//! ```text
//! GET /api/v1/admin/users?role=educator&search=ann&page=1
//! PUT /api/v1/admin/users/{user_id}/role {"role":"educator"}
//! PUT /api/v1/admin/discussions/{thread_id}/moderation {"status":"closed","isPinned":true}
//! DELETE /api/v1/admin/comments/{comment_id}
//! ```
//!
//! Every handler rejects non-admins before the request reaches a port.

use actix_web::{HttpResponse, delete, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{USERS_PAGE_SIZE, UserFilter};
use crate::domain::{Error, Role, ThreadModeration, ThreadStatus, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{PageResponse, ThreadResponse, UserResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_request;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub role: Option<Role>,
    /// Matches username, email and names, case-insensitively.
    pub search: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    pub role: Role,
}

/// Moderation changes; omitted fields stay as they are.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRequest {
    pub status: Option<ThreadStatus>,
    pub is_pinned: Option<bool>,
}

impl From<ModerationRequest> for ThreadModeration {
    fn from(value: ModerationRequest) -> Self {
        Self {
            status: value.status,
            is_pinned: value.is_pinned,
        }
    }
}

async fn require_admin(session: &SessionContext, state: &HttpState) -> Result<User, Error> {
    let actor = session.require_user(state).await?;
    actor.require_admin()?;
    Ok(actor)
}

/// Page through accounts.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = PageResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<PageResponse<UserResponse>>> {
    let actor = require_admin(&session, &state).await?;
    let UserListQuery { role, search, page } = query.into_inner();
    let page = page_request(page, USERS_PAGE_SIZE)?;
    let users = state
        .accounts
        .list_users(&actor, UserFilter { role, search }, page)
        .await?;
    Ok(web::Json(PageResponse::from_page(users, Into::into)))
}

/// Assign a role to an account.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{user_id}/role",
    params(("user_id" = Uuid, Path, description = "User id")),
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "changeRole"
)]
#[put("/admin/users/{user_id}/role")]
pub async fn change_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<RoleChangeRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = require_admin(&session, &state).await?;
    let user = state
        .accounts
        .change_role(
            &actor,
            UserId::from_uuid(path.into_inner()),
            payload.into_inner().role,
        )
        .await?;
    Ok(web::Json(user.into()))
}

/// Change a thread's status or pin.
#[utoipa::path(
    put,
    path = "/api/v1/admin/discussions/{thread_id}/moderation",
    params(("thread_id" = Uuid, Path, description = "Thread id")),
    request_body = ModerationRequest,
    responses(
        (status = 200, description = "Moderated thread", body = ThreadResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "moderateThread"
)]
#[put("/admin/discussions/{thread_id}/moderation")]
pub async fn moderate_thread(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ModerationRequest>,
) -> ApiResult<web::Json<ThreadResponse>> {
    let actor = require_admin(&session, &state).await?;
    let thread = state
        .discussions
        .moderate_thread(&actor, path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(thread.into()))
}

/// Remove a comment and its replies.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/comments/{comment_id}",
    params(("comment_id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteComment"
)]
#[delete("/admin/comments/{comment_id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = require_admin(&session, &state).await?;
    state
        .discussions
        .delete_comment(&actor, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
