//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health checks and the
//! session cookie security scheme. Request and response schemas referenced
//! by the handlers are collected automatically; the shared ones are listed
//! explicitly so they keep stable names. Swagger UI serves the document in
//! debug builds and `cargo run --bin openapi-dump` prints it.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    DifficultyLevel, Error, ErrorCode, ModuleStatus, QuestionType, QuizDifficulty, Role,
    ThreadStatus,
};
use crate::inbound::http::schemas::{DashboardResponse, UserResponse};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Civic learning platform API",
        description = "Learning modules, quizzes and discussion forums for admins, educators and citizens."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::accounts::own_profile,
        crate::inbound::http::accounts::user_profile,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::dashboards::home,
        crate::inbound::http::dashboards::dashboard,
        crate::inbound::http::dashboards::admin_dashboard,
        crate::inbound::http::dashboards::educator_dashboard,
        crate::inbound::http::dashboards::citizen_dashboard,
        crate::inbound::http::modules::list_modules,
        crate::inbound::http::modules::create_module,
        crate::inbound::http::modules::get_module,
        crate::inbound::http::modules::update_module,
        crate::inbound::http::quizzes::list_quizzes,
        crate::inbound::http::quizzes::create_quiz,
        crate::inbound::http::quizzes::get_quiz,
        crate::inbound::http::quizzes::update_quiz,
        crate::inbound::http::quizzes::add_question,
        crate::inbound::http::quizzes::remove_question,
        crate::inbound::http::attempts::start_attempt,
        crate::inbound::http::attempts::submit_attempt,
        crate::inbound::http::attempts::attempt_result,
        crate::inbound::http::discussions::list_threads,
        crate::inbound::http::discussions::create_thread,
        crate::inbound::http::discussions::get_thread,
        crate::inbound::http::discussions::update_thread,
        crate::inbound::http::discussions::add_comment,
        crate::inbound::http::discussions::edit_comment,
        crate::inbound::http::discussions::toggle_like,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::change_role,
        crate::inbound::http::admin::moderate_thread,
        crate::inbound::http::admin::delete_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        ModuleStatus,
        DifficultyLevel,
        QuizDifficulty,
        QuestionType,
        ThreadStatus,
        UserResponse,
        DashboardResponse,
    )),
    tags(
        (name = "accounts", description = "Registration, sessions and profiles"),
        (name = "dashboards", description = "Landing page and role dashboards"),
        (name = "modules", description = "Learning module catalogue and authoring"),
        (name = "quizzes", description = "Quiz catalogue and authoring"),
        (name = "attempts", description = "Taking and reviewing quizzes"),
        (name = "discussions", description = "Discussion threads and comments"),
        (name = "admin", description = "User management and moderation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_has_field(schema: &RefOr<Schema>, field: &str) -> bool {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.contains_key(field),
            _ => false,
        }
    }

    #[rstest]
    fn error_schema_exposes_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("Error").expect("Error schema");

        assert!(object_has_field(error, "code"));
        assert!(object_has_field(error, "message"));
    }

    #[rstest]
    fn user_schema_never_exposes_credentials() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user = schemas.get("UserResponse").expect("UserResponse schema");

        assert!(object_has_field(user, "username"));
        assert!(object_has_field(user, "displayName"));
        assert!(!object_has_field(user, "password"));
        assert!(!object_has_field(user, "passwordHash"));
    }

    #[rstest]
    #[case("/api/v1/quizzes/{quiz_id}/attempt/submit")]
    #[case("/api/v1/admin/users")]
    #[case("/api/v1/discussions/{thread_id}/comments")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn submit_documents_the_status_codes_it_returns() {
        let doc = ApiDoc::openapi();
        let submit = doc
            .paths
            .paths
            .get("/api/v1/quizzes/{quiz_id}/attempt/submit")
            .and_then(|item| item.post.as_ref())
            .expect("submit operation");
        let codes: Vec<&str> = submit.responses.responses.keys().map(String::as_str).collect();
        for code in ["200", "400", "401", "403", "404", "409"] {
            assert!(codes.contains(&code), "missing {code}");
        }
        let Some(RefOr::T(conflict)) = submit.responses.responses.get("409") else {
            panic!("inline 409 response");
        };
        assert!(conflict.description.contains("No open attempt"));
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
