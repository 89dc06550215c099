//! Landing page and role dashboards.
//!
//! ```text
//! GET /api/v1/home
//! GET /api/v1/dashboard
//! GET /api/v1/dashboard/{admin,educator,citizen}
//! ```

use actix_web::{get, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    AdminDashboardResponse, CitizenDashboardResponse, DashboardResponse,
    EducatorDashboardResponse, HomeResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Public landing page figures.
#[utoipa::path(
    get,
    path = "/api/v1/home",
    responses((status = 200, description = "Landing page summary", body = HomeResponse)),
    tags = ["dashboards"],
    operation_id = "home",
    security([])
)]
#[get("/home")]
pub async fn home(state: web::Data<HttpState>) -> ApiResult<web::Json<HomeResponse>> {
    let summary = state.dashboards.home().await?;
    Ok(web::Json(summary.into()))
}

/// Dashboard for the caller's role, tagged with that role.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Role dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardResponse>> {
    let viewer = session.require_user(&state).await?;
    let dashboard = state.dashboards.dashboard(&viewer).await?;
    Ok(web::Json(dashboard.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/admin",
    responses(
        (status = 200, description = "Admin dashboard", body = AdminDashboardResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "adminDashboard"
)]
#[get("/dashboard/admin")]
pub async fn admin_dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AdminDashboardResponse>> {
    let viewer = session.require_user(&state).await?;
    Ok(web::Json(state.dashboards.admin(&viewer).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/educator",
    responses(
        (status = 200, description = "Educator dashboard", body = EducatorDashboardResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Educators only", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "educatorDashboard"
)]
#[get("/dashboard/educator")]
pub async fn educator_dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<EducatorDashboardResponse>> {
    let viewer = session.require_user(&state).await?;
    Ok(web::Json(state.dashboards.educator(&viewer).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/citizen",
    responses(
        (status = 200, description = "Citizen dashboard", body = CitizenDashboardResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Citizens only", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "citizenDashboard"
)]
#[get("/dashboard/citizen")]
pub async fn citizen_dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CitizenDashboardResponse>> {
    let viewer = session.require_user(&state).await?;
    Ok(web::Json(state.dashboards.citizen(&viewer).await?.into()))
}
