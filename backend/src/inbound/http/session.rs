//! Cookie session access for handlers.
//!
//! The private session cookie carries the signed-in user's id and role.
//! Handlers go through [`SessionContext`] so they never touch raw keys.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Role, SessionUser, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Handler-facing view of the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the signed-in user and rotate the session id.
    pub fn persist_user(&self, user: &SessionUser) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user.id.to_string())
            .and_then(|()| self.0.insert(ROLE_KEY, user.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The signed-in user, if the cookie holds a well-formed one.
    ///
    /// Malformed values are logged and treated as signed out.
    pub fn session_user(&self) -> Result<Option<SessionUser>, Error> {
        let raw_id = self.read(USER_ID_KEY)?;
        let raw_role = self.read(ROLE_KEY)?;
        let (Some(raw_id), Some(raw_role)) = (raw_id, raw_role) else {
            return Ok(None);
        };

        let id = match UserId::new(&raw_id) {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        let role = match raw_role.parse::<Role>() {
            Ok(role) => role,
            Err(error) => {
                warn!(%error, "invalid role in session cookie");
                return Ok(None);
            }
        };
        Ok(Some(SessionUser { id, role }))
    }

    /// The signed-in user or `401 Unauthorized`.
    pub fn require_user(&self) -> Result<SessionUser, Error> {
        self.session_user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every session value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
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
