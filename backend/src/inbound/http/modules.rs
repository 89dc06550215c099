//! Learning module catalogue handlers.
//!
//! ```text
//! GET /api/v1/modules?difficulty=beginner&search=vote&page=2
//! POST /api/v1/modules
//! GET /api/v1/modules/{slug}
//! PUT /api/v1/modules/{slug}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::MODULES_PAGE_SIZE;
use crate::domain::{DifficultyLevel, Error, ModuleFilter, ModuleForm, ModuleStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ModuleDetailResponse, ModuleResponse, PageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_request;

/// Catalogue filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModuleListQuery {
    pub difficulty: Option<DifficultyLevel>,
    /// Case-insensitive match against title or description.
    pub search: Option<String>,
    pub page: Option<u32>,
}

/// Module authoring payload used for create and update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRequest {
    #[schema(example = "Voting basics")]
    pub title: String,
    /// Generated from the title when omitted.
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub status: Option<ModuleStatus>,
    pub order: Option<i32>,
    pub image_url: Option<String>,
    pub attachment_url: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
    pub estimated_minutes: Option<i32>,
}

impl From<ModuleRequest> for ModuleForm {
    fn from(value: ModuleRequest) -> Self {
        Self {
            title: value.title,
            slug: value.slug,
            description: value.description,
            content: value.content,
            status: value.status,
            order: value.order,
            image_url: value.image_url,
            attachment_url: value.attachment_url,
            difficulty_level: value.difficulty_level,
            estimated_minutes: value.estimated_minutes,
        }
    }
}

/// Published modules, 12 per page.
#[utoipa::path(
    get,
    path = "/api/v1/modules",
    params(ModuleListQuery),
    responses(
        (status = 200, description = "Published modules", body = PageResponse<ModuleResponse>),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["modules"],
    operation_id = "listModules",
    security([])
)]
#[get("/modules")]
pub async fn list_modules(
    state: web::Data<HttpState>,
    query: web::Query<ModuleListQuery>,
) -> ApiResult<web::Json<PageResponse<ModuleResponse>>> {
    let ModuleListQuery {
        difficulty,
        search,
        page,
    } = query.into_inner();
    let page = page_request(page, MODULES_PAGE_SIZE)?;
    let modules = state
        .modules
        .list_published(ModuleFilter { difficulty, search }, page)
        .await?;
    Ok(web::Json(PageResponse::from_page(modules, Into::into)))
}

/// Create a module (educators only).
#[utoipa::path(
    post,
    path = "/api/v1/modules",
    request_body = ModuleRequest,
    responses(
        (status = 201, description = "Module created", body = ModuleResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Educators only", body = Error),
        (status = 409, description = "Title or slug taken", body = Error)
    ),
    tags = ["modules"],
    operation_id = "createModule"
)]
#[post("/modules")]
pub async fn create_module(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ModuleRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user(&state).await?;
    let module = state
        .modules
        .create(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(ModuleResponse::from(module)))
}

/// Module with its published quizzes and discussion threads.
///
/// Unpublished modules are only visible to their author and admins.
#[utoipa::path(
    get,
    path = "/api/v1/modules/{slug}",
    params(("slug" = String, Path, description = "Module slug")),
    responses(
        (status = 200, description = "Module detail", body = ModuleDetailResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["modules"],
    operation_id = "getModule",
    security([])
)]
#[get("/modules/{slug}")]
pub async fn get_module(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ModuleDetailResponse>> {
    let viewer = session.viewer(&state).await?;
    let detail = state
        .modules
        .get_by_slug(viewer, path.into_inner())
        .await?;
    Ok(web::Json(detail.into()))
}

/// Update a module (its author or an admin).
#[utoipa::path(
    put,
    path = "/api/v1/modules/{slug}",
    params(("slug" = String, Path, description = "Module slug")),
    request_body = ModuleRequest,
    responses(
        (status = 200, description = "Updated module", body = ModuleResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Title or slug taken", body = Error)
    ),
    tags = ["modules"],
    operation_id = "updateModule"
)]
#[put("/modules/{slug}")]
pub async fn update_module(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ModuleRequest>,
) -> ApiResult<web::Json<ModuleResponse>> {
    let actor = session.require_user(&state).await?;
    let module = state
        .modules
        .update(&actor, path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(module.into()))
}
