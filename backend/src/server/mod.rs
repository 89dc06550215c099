//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, Storage};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use learning_backend::Trace;
#[cfg(debug_assertions)]
use learning_backend::doc::ApiDoc;
use learning_backend::inbound::http::configure_api;
use learning_backend::inbound::http::health::{HealthState, live, ready};
use learning_backend::inbound::http::session_config::SessionSettings;
use learning_backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the API, health checks and (in debug builds) Swagger UI, then mark the
/// service ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        session,
        bind_addr,
        storage: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use actix_web::cookie::{Key, SameSite};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use learning_backend::domain::TRACE_ID_HEADER;
    use learning_backend::inbound::http::state::Repositories;
    use learning_backend::outbound::memory::MemoryStore;
    use learning_backend::test_support::{MutableClock, fixture_now};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    fn deps() -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            http_state: web::Data::new(HttpState::from_repositories(
                Repositories::shared(Arc::new(MemoryStore::new())),
                Arc::new(MutableClock::new(fixture_now())),
            )),
            session: SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
                ttl: actix_web::cookie::time::Duration::hours(2),
            },
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn health_checks_are_mounted_outside_the_api_scope() {
        let app = test::init_service(build_app(deps())).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn api_errors_carry_the_trace_header() {
        let app = test::init_service(build_app(deps())).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/me").to_request())
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("trace header");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(body["traceId"], header.as_str());
    }

    #[rstest]
    #[actix_web::test]
    async fn home_is_served_from_the_in_memory_store() {
        let app = test::init_service(build_app(deps())).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/v1/home").to_request())
                .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["publishedModules"], 0);
        assert_eq!(body["totalUsers"], 0);
    }
}
