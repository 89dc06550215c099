//! In-process API server and shared world for behaviour tests.
//!
//! The world owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Each scenario gets a fresh
//! [`MemoryStore`] and a frozen clock, and the server is stopped when the
//! fixture drops, even if a step panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use awc::Client;
use learning_backend::Trace;
use learning_backend::domain::ports::UserRepository;
use learning_backend::domain::{NewPassword, Role, TRACE_ID_HEADER};
use learning_backend::inbound::http::configure_api;
use learning_backend::inbound::http::session_config::SESSION_COOKIE_NAME;
use learning_backend::inbound::http::state::{HttpState, Repositories};
use learning_backend::outbound::memory::MemoryStore;
use learning_backend::test_support::{MutableClock, fixture_now, user_with_role};
use rstest::fixture;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// Password given to every seeded account.
pub(crate) const PASSWORD: &str = "correct horse battery";

/// Status, trace header and JSON body of the most recent request.
#[derive(Debug, Clone)]
pub(crate) struct LastResponse {
    pub(crate) status: u16,
    pub(crate) trace_id: Option<String>,
    pub(crate) body: Value,
}

pub(crate) struct WorldFixture {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    store: Arc<MemoryStore>,
    clock: Arc<MutableClock>,
    /// Cookie pair per signed-in username.
    sessions: RefCell<HashMap<String, String>>,
    /// Values captured by earlier steps, keyed by what they name.
    memory: RefCell<HashMap<String, Value>>,
    last: RefCell<Option<LastResponse>>,
}

impl WorldFixture {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }

    /// Store an account directly, bypassing registration rules so admins
    /// can be created.
    pub(crate) fn seed_user(&self, username: &str, role: Role) {
        let user = user_with_role(username, role);
        let hash = NewPassword::new(PASSWORD, PASSWORD)
            .expect("fixture password")
            .hash()
            .expect("hash fixture password");
        let store = self.store.clone();
        self.block_on(async move { store.insert(&user, &hash).await })
            .expect("seed user");
    }

    /// Log `username` in and keep the session cookie on success.
    pub(crate) fn sign_in(&self, username: &str, password: &str) {
        self.send(
            Some(username),
            Method::POST,
            "/api/v1/login",
            Some(json!({ "username": username, "password": password })),
        );
    }

    /// Send a request, as `actor` when given, and record the response.
    ///
    /// Session cookies set or cleared by the response are tracked per
    /// actor, so later requests behave like a browser would.
    pub(crate) fn send(
        &self,
        actor: Option<&str>,
        method: Method,
        path: &str,
        payload: Option<Value>,
    ) -> Value {
        let cookie = actor.and_then(|name| self.sessions.borrow().get(name).cloned());
        let url = format!("{}{path}", self.base_url);
        let (response, set_cookie) = self.block_on(async move {
            let mut request = Client::default().request(method, url);
            if let Some(cookie) = cookie {
                request = request.insert_header((header::COOKIE, cookie));
            }
            let mut response = match payload {
                Some(payload) => request.send_json(&payload).await,
                None => request.send().await,
            }
            .expect("api request");
            let set_cookie = response
                .headers()
                .get(header::SET_COOKIE)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(';').next())
                .map(str::to_owned);
            (read_response(&mut response).await, set_cookie)
        });
        if let (Some(name), Some(pair)) = (actor, set_cookie) {
            let mut sessions = self.sessions.borrow_mut();
            if pair.ends_with('=') {
                sessions.remove(name);
            } else {
                sessions.insert(name.to_owned(), pair);
            }
        }
        let body = response.body.clone();
        self.last.replace(Some(response));
        body
    }

    pub(crate) fn advance_seconds(&self, seconds: i64) {
        self.clock.advance_seconds(seconds);
    }

    pub(crate) fn remember(&self, key: &str, value: Value) {
        self.memory.borrow_mut().insert(key.to_owned(), value);
    }

    pub(crate) fn recall(&self, key: &str) -> Value {
        self.memory
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_else(|| panic!("nothing remembered as {key}"))
    }

    /// A remembered string, typically an id or slug.
    pub(crate) fn recall_str(&self, key: &str) -> String {
        self.recall(key)
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| panic!("{key} is not a string"))
    }

    pub(crate) fn last(&self) -> LastResponse {
        self.last.borrow().clone().expect("no request sent yet")
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let server = self.server.clone();
        self.block_on(async move {
            server.stop(true).await;
        });
    }
}

async fn read_response<S>(response: &mut awc::ClientResponse<S>) -> LastResponse
where
    S: futures_util::Stream<Item = Result<actix_web::web::Bytes, awc::error::PayloadError>>
        + Unpin,
{
    let status = response.status().as_u16();
    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = response.body().await.expect("response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    LastResponse {
        status,
        trace_id,
        body,
    }
}

fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(2)))
        .build()
}

async fn spawn_server(state: HttpState) -> std::io::Result<(String, ServerHandle)> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session_middleware(key.clone()))
                    .configure(configure_api),
            )
    })
    .disable_signals()
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

#[fixture]
pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MutableClock::new(fixture_now()));
    let state = HttpState::from_repositories(Repositories::shared(store.clone()), clock.clone());

    let (base_url, server) = local
        .block_on(&runtime, spawn_server(state))
        .expect("server should start");

    WorldFixture {
        runtime,
        local,
        base_url,
        server,
        store,
        clock,
        sessions: RefCell::new(HashMap::new()),
        memory: RefCell::new(HashMap::new()),
        last: RefCell::new(None),
    }
}
