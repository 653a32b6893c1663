use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::{AdminAuth, AuthError};

/// Gate for admin API routes: 401 without a live session.
pub async fn require_admin_api(
    State(auth): State<Arc<AdminAuth>>,
    request: Request,
    next: Next,
) -> Response {
    if auth.session_user(request.headers()).is_none() {
        return AuthError::MissingSession.into_response();
    }
    next.run(request).await
}

/// Gate for admin pages: redirect to the login page without a live session.
pub async fn require_admin_page(
    State(auth): State<Arc<AdminAuth>>,
    request: Request,
    next: Next,
) -> Response {
    if auth.session_user(request.headers()).is_none() {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}
