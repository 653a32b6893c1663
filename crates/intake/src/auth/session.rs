use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use uuid::Uuid;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone)]
struct SessionEntry {
    user: String,
    expires_at: DateTime<Utc>,
}

/// In-process session store keyed by random tokens. Sessions do not survive a restart.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session for `user` and return its token.
    pub fn create(&self, user: &str) -> String {
        self.create_at(user, Utc::now())
    }

    fn create_at(&self, user: &str, now: DateTime<Utc>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            token.clone(),
            SessionEntry {
                user: user.to_string(),
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// User owning a live session, evicting it if it has expired.
    pub fn user(&self, token: &str) -> Option<String> {
        self.user_at(token, Utc::now())
    }

    fn user_at(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(token) {
            Some(entry) if entry.expires_at > now => Some(entry.user.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Returns whether a session was removed.
    pub fn destroy(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Set-Cookie` value handing `token` to the browser.
    pub fn session_cookie(&self, token: &str) -> String {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::seconds(self.ttl.num_seconds()))
            .build()
            .to_string()
    }
}

/// `Set-Cookie` value that clears the session cookie.
pub fn removal_cookie() -> String {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie.to_string()
}

/// Session token from the request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw).filter_map(Result::ok))
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
