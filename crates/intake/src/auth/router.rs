use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::session::{removal_cookie, session_token};
use super::AdminAuth;
use crate::extract::JsonBody;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Router exposing `/api/login` and `/api/logout`.
pub fn auth_router(auth: Arc<AdminAuth>) -> Router {
    Router::new()
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        .with_state(auth)
}

pub(crate) async fn login_handler(
    State(auth): State<Arc<AdminAuth>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Response {
    match auth.login(&request.username, &request.password) {
        Ok(token) => {
            info!(user = %request.username, "admin session opened");
            let cookie = auth.sessions().session_cookie(&token);
            (
                [(SET_COOKIE, cookie)],
                Json(json!({ "message": "Login correcto" })),
            )
                .into_response()
        }
        Err(err) => {
            warn!(user = %request.username, "admin login rejected");
            err.into_response()
        }
    }
}

pub(crate) async fn logout_handler(
    State(auth): State<Arc<AdminAuth>>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = session_token(&headers) {
        if auth.sessions().destroy(&token) {
            info!("admin session closed");
        }
    }

    (
        [(SET_COOKIE, removal_cookie())],
        Json(json!({ "message": "Sesión cerrada" })),
    )
        .into_response()
}
