//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers translate requests into driving-port calls on [`state::HttpState`]
//! and map domain results onto the JSON DTOs in [`schemas`].

pub mod accounts;
pub mod admin;
pub mod attempts;
pub mod dashboards;
pub mod discussions;
pub mod error;
pub mod health;
pub mod modules;
pub mod quizzes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` handler and the extractor error envelopes.
///
/// Mount inside a scope that carries the session middleware:
///
/// ```ignore
/// App::new().service(web::scope("/api/v1").wrap(session).configure(configure_api))
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(accounts::register)
        .service(accounts::login)
        .service(accounts::logout)
        .service(accounts::current_user)
        .service(accounts::own_profile)
        .service(accounts::user_profile)
        .service(accounts::update_profile)
        .service(dashboards::home)
        .service(dashboards::dashboard)
        .service(dashboards::admin_dashboard)
        .service(dashboards::educator_dashboard)
        .service(dashboards::citizen_dashboard)
        .service(modules::list_modules)
        .service(modules::create_module)
        .service(modules::get_module)
        .service(modules::update_module)
        .service(quizzes::list_quizzes)
        .service(quizzes::create_quiz)
        .service(quizzes::get_quiz)
        .service(quizzes::update_quiz)
        .service(quizzes::add_question)
        .service(quizzes::remove_question)
        .service(attempts::start_attempt)
        .service(attempts::submit_attempt)
        .service(attempts::attempt_result)
        .service(discussions::list_threads)
        .service(discussions::create_thread)
        .service(discussions::get_thread)
        .service(discussions::update_thread)
        .service(discussions::add_comment)
        .service(discussions::edit_comment)
        .service(discussions::toggle_like)
        .service(admin::list_users)
        .service(admin::change_role)
        .service(admin::moderate_thread)
        .service(admin::delete_comment);
}
