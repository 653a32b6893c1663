use crate::cli::ServeArgs;
use crate::infra::{AppState, Notifier};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use intake::auth::AdminAuth;
use intake::config::AppConfig;
use intake::error::AppError;
use intake::telemetry;
use intake::workflows::admissions::{AdmissionService, SqliteApplicantRepository};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(SqliteApplicantRepository::connect(&config.database.url).await?);
    let notifier = Arc::new(Notifier::from_config(&config.notifier));
    let notifications_enabled = notifier.is_enabled();
    let admission_service = Arc::new(AdmissionService::new(
        repository,
        notifier,
        config.notifier.country_code.clone(),
    ));
    let auth = Arc::new(AdminAuth::from_config(&config.admin));

    let app = with_intake_routes(admission_service, auth, &config.pages)
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        database = %config.database.url,
        notifications_enabled,
        "pre-enrollment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
