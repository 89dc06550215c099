//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test;
use serde_json::json;

use crate::domain::ports::{
    MockAccounts, MockAttempts, MockDashboards, MockDiscussions, MockModules, MockQuizzes,
};
use crate::domain::User;
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Disables the `Secure` flag for local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .expect("session cookie set")
        .into_owned()
}

/// Mocked driving ports; tests set expectations on the ones they exercise.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccounts,
    pub modules: MockModules,
    pub quizzes: MockQuizzes,
    pub attempts: MockAttempts,
    pub discussions: MockDiscussions,
    pub dashboards: MockDashboards,
}

impl MockPorts {
    /// Mock ports where `/login` succeeds as `user` and the session resolves
    /// back to that user.
    pub fn signed_in_as(user: &User) -> Self {
        let mut ports = Self::default();
        let logged_in = user.clone();
        ports
            .accounts
            .expect_login()
            .returning(move |_| Ok(logged_in.clone()));
        let current = user.clone();
        ports
            .accounts
            .expect_current_user()
            .returning(move |_| Ok(current.clone()));
        ports
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            accounts: Arc::new(self.accounts),
            modules: Arc::new(self.modules),
            quizzes: Arc::new(self.quizzes),
            attempts: Arc::new(self.attempts),
            discussions: Arc::new(self.discussions),
            dashboards: Arc::new(self.dashboards),
        })
    }
}

/// State whose only configured port is `accounts`.
pub fn test_state(accounts: MockAccounts) -> HttpState {
    MockPorts {
        accounts,
        ..MockPorts::default()
    }
    .into_state()
}

/// Log in through `POST /api/v1/login` and return the session cookie.
///
/// The app must mount the login handler and mock `Accounts::login`.
pub async fn login_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": "someone", "password": "correct horse" }))
            .to_request(),
    )
    .await;
    session_cookie(&res)
}
