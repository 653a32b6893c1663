//! Single-administrator authentication: credential check, session store, and route gates.

pub mod gate;
pub mod router;
pub mod session;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Duration;
use serde_json::json;

use crate::config::{AdminConfig, MAX_SESSION_TTL_SECS};

pub use gate::{require_admin_api, require_admin_page};
pub use router::auth_router;
pub use session::{removal_cookie, session_token, SessionStore, SESSION_COOKIE};

/// The one username/password pair allowed into the admin area.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Credential and session state shared by the login routes and the gates.
#[derive(Debug)]
pub struct AdminAuth {
    credentials: AdminCredentials,
    sessions: SessionStore,
}

impl AdminAuth {
    pub fn new(credentials: AdminCredentials, sessions: SessionStore) -> Self {
        Self {
            credentials,
            sessions,
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        let secs = config.session_ttl_secs.min(MAX_SESSION_TTL_SECS);
        let ttl = Duration::seconds(i64::try_from(secs).unwrap_or_default());
        Self::new(
            AdminCredentials::new(config.username.clone(), config.password.clone()),
            SessionStore::new(ttl),
        )
    }

    pub fn credentials(&self) -> &AdminCredentials {
        &self.credentials
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Check the pair and open a session, returning its token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if !self.credentials.verify(username, password) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.sessions.create(username))
    }

    /// Admin user behind the request's session cookie, if the session is live.
    pub fn session_user(&self, headers: &HeaderMap) -> Option<String> {
        let token = session_token(headers)?;
        self.sessions
            .user(&token)
            .filter(|user| user == self.credentials.username())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Usuario o contraseña incorrectos")]
    InvalidCredentials,
    #[error("No autorizado")]
    MissingSession,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
