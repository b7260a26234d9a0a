use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    config::AppConfig,
    models::{Role, Session, UnknownRole},
};

/// SessionError
///
/// Reasons a stored session value cannot be read. None of these reach the navigation
/// guard: `load_session` turns every one of them into "no session".
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("stored session is empty")]
    Empty,
    #[error("stored session is not a valid session object: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
}

// Shape of the `user` object the login endpoint hands the client. Extra fields
// (`is_admin`, anything newer) are ignored.
#[derive(Deserialize)]
struct StoredSession {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    role: String,
}

/// parse_session
///
/// Decodes the serialized session written at login.
pub fn parse_session(raw: &str) -> Result<Session, SessionError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SessionError::Empty);
    }

    let stored: StoredSession = serde_json::from_str(raw)?;
    let role: Role = stored.role.parse()?;

    Ok(Session {
        id: stored.id,
        username: stored.username,
        email: stored.email,
        role,
    })
}

// 1. SessionStorage Contract
/// SessionStorage
///
/// Read side of the client-local store holding the serialized session. The navigation
/// guard only ever reads; writing happens at login/logout.
pub trait SessionStorage {
    /// The raw stored value, or `None` when nothing is stored.
    fn read(&self) -> Option<String>;
}

/// load_session
///
/// Fail-safe read: an unreadable value is logged and treated as an absent session, which
/// sends protected navigations to the login page.
pub fn load_session(storage: &dyn SessionStorage) -> Option<Session> {
    let raw = storage.read()?;
    match parse_session(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable stored session");
            None
        }
    }
}

// 2. The Cookie Implementation (HTTP clients)
/// CookieStorage
///
/// Reads the session from a named cookie. The value is the same JSON the browser
/// client keeps, percent-encoded on the wire.
pub struct CookieStorage<'a> {
    jar: &'a CookieJar,
    name: &'a str,
}

impl<'a> CookieStorage<'a> {
    pub fn new(jar: &'a CookieJar, name: &'a str) -> Self {
        Self { jar, name }
    }
}

impl SessionStorage for CookieStorage<'_> {
    fn read(&self) -> Option<String> {
        self.jar.get(self.name).map(|cookie| cookie.value().to_string())
    }
}

/// session_cookie
///
/// Builds the cookie written at login.
pub fn session_cookie(name: &str, session: &Session) -> Result<Cookie<'static>, serde_json::Error> {
    let value = serde_json::to_string(session)?;
    Ok(Cookie::build((name.to_string(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build())
}

/// Cookie that, once removed from a jar, clears the session at logout.
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(name.to_string()).path("/").build()
}

// 3. The In-Memory Implementation (Tests and embedding)
/// MemoryStorage
///
/// Holds the raw stored value directly. Used by tests and by callers that already have
/// the serialized session in hand.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    value: Option<String>,
}

impl MemoryStorage {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_session(session: &Session) -> Self {
        Self {
            value: serde_json::to_string(session).ok(),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> Option<String> {
        self.value.clone()
    }
}

/// CurrentSession Extractor
///
/// Resolves the session of an incoming request from the configured session cookie.
/// Never rejects: a missing or unreadable cookie yields `CurrentSession(None)`.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let storage = CookieStorage::new(&jar, &config.session_cookie);
        Ok(CurrentSession(load_session(&storage)))
    }
}
