//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie only carries the user id. Handlers that need the full account
//! resolve it through the `Accounts` port, so role changes and deleted
//! accounts take effect on the next request.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, ErrorCode, User, UserId};
use crate::inbound::http::state::HttpState;

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    ///
    /// The session is renewed first so a pre-login cookie never carries an
    /// authenticated identity.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop every value from the session and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Resolve the signed-in account or return `401 Unauthorized`.
    ///
    /// A cookie naming an account that no longer exists is purged.
    pub async fn require_user(&self, state: &HttpState) -> Result<User, Error> {
        let id = self.require_user_id()?;
        match state.accounts.current_user(&id).await {
            Ok(user) => Ok(user),
            Err(error) if error.code() == ErrorCode::NotFound => {
                self.purge();
                Err(Error::unauthorized("login required"))
            }
            Err(error) => Err(error),
        }
    }

    /// Resolve the signed-in account when there is one.
    pub async fn viewer(&self, state: &HttpState) -> Result<Option<User>, Error> {
        if self.user_id()?.is_none() {
            return Ok(None);
        }
        match self.require_user(state).await {
            Ok(user) => Ok(Some(user)),
            Err(error) if error.code() == ErrorCode::Unauthorized => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
