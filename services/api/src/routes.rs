use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use intake::auth::{auth_router, require_admin_page, AdminAuth};
use intake::config::PagesConfig;
use intake::workflows::admissions::{
    admission_router, AdmissionService, ApplicantRepository, NotificationSender,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

/// Public pages and the view file each one serves.
const PUBLIC_PAGES: [(&str, &str); 6] = [
    ("/", "index.html"),
    ("/preinscripcion", "preinscripcion.html"),
    ("/login", "login.html"),
    ("/docentes", "docentes.html"),
    ("/acerca", "acerca.html"),
    ("/ubicacion", "ubicacion.html"),
];

pub(crate) fn with_intake_routes<R, N>(
    service: Arc<AdmissionService<R, N>>,
    auth: Arc<AdminAuth>,
    pages: &PagesConfig,
) -> Router
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    let admin_page = Router::new()
        .route_service("/admin", ServeFile::new(pages.views_dir.join("admin.html")))
        .route_layer(middleware::from_fn_with_state(
            auth.clone(),
            require_admin_page,
        ));

    let public_pages = PUBLIC_PAGES
        .into_iter()
        .fold(Router::new(), |router, (path, file)| {
            router.route_service(path, ServeFile::new(pages.views_dir.join(file)))
        });

    admission_router(service, auth.clone())
        .merge(auth_router(auth))
        .merge(admin_page)
        .merge(public_pages)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .fallback_service(ServeDir::new(&pages.public_dir))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
