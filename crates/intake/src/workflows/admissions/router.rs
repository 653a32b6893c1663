use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::error;

use super::domain::{AdmissionDecision, AdmissionStatus, ApplicantId, ApplicantSubmission};
use super::notifier::NotificationSender;
use super::repository::ApplicantRepository;
use super::service::{AdmissionError, AdmissionOutcome, AdmissionService};
use crate::auth::{require_admin_api, AdminAuth};
use crate::extract::JsonBody;

/// Body of the accept/reject/delete actions.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApplicantAction {
    #[serde(deserialize_with = "deserialize_applicant_id")]
    pub id: ApplicantId,
}

/// Router exposing the public submission endpoint and the session-gated admin actions.
pub fn admission_router<R, N>(service: Arc<AdmissionService<R, N>>, auth: Arc<AdminAuth>) -> Router
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    let admin = Router::new()
        .route("/api/preinscripciones", get(list_handler::<R, N>))
        .route("/api/aceptar_estudiante", post(accept_handler::<R, N>))
        .route("/api/rechazar_estudiante", post(reject_handler::<R, N>))
        .route("/api/borrar_estudiante", post(delete_handler::<R, N>))
        .route_layer(middleware::from_fn_with_state(auth, require_admin_api));

    Router::new()
        .route("/api/preinscripcion", post(submit_handler::<R, N>))
        .merge(admin)
        .with_state(service)
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    JsonBody(submission): JsonBody<ApplicantSubmission>,
) -> Response
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.submit(submission).await {
        Ok(record) => {
            let payload = json!({
                "message": "Preinscripción enviada correctamente",
                "id": record.id,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(AdmissionError::Storage(err)) => {
            error!(%err, "failed to store pre-enrollment submission");
            message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al guardar la preinscripción",
            )
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
) -> Response
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.list().await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => {
            error!(%err, "failed to list pre-enrollment records");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error al obtener registros")
        }
    }
}

pub(crate) async fn accept_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    JsonBody(action): JsonBody<ApplicantAction>,
) -> Response
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    decision_response(service.decide(action.id, AdmissionDecision::Accept).await)
}

pub(crate) async fn reject_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    JsonBody(action): JsonBody<ApplicantAction>,
) -> Response
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    decision_response(service.decide(action.id, AdmissionDecision::Reject).await)
}

pub(crate) async fn delete_handler<R, N>(
    State(service): State<Arc<AdmissionService<R, N>>>,
    JsonBody(action): JsonBody<ApplicantAction>,
) -> Response
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.delete(action.id).await {
        Ok(()) => message(StatusCode::OK, "Estudiante eliminado"),
        Err(err) => error_response(err),
    }
}

fn decision_response(result: Result<AdmissionOutcome, AdmissionError>) -> Response {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => return error_response(err),
    };

    match outcome {
        AdmissionOutcome::Notified {
            id,
            status,
            recipient,
            message_id,
        } => {
            let text = match status {
                AdmissionStatus::Rejected => "Estudiante rechazado y mensaje enviado",
                _ => "Estudiante aceptado y mensaje enviado",
            };
            let payload = json!({
                "message": text,
                "id": id,
                "estado": status,
                "telefono": recipient,
                "message_id": message_id,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        AdmissionOutcome::DeliveryFailed {
            id,
            status,
            recipient,
            error,
        } => {
            let payload = json!({
                "message": "Error enviando mensaje",
                "id": id,
                "estado": status,
                "telefono": recipient,
                "detail": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

/// Fixed text for storage failures; the driver error only goes to the log.
const STORAGE_FAILURE: &str = "Error al acceder a los registros";

fn error_response(err: AdmissionError) -> Response {
    match err {
        AdmissionError::NotFound(_) => message(StatusCode::NOT_FOUND, "Estudiante no encontrado"),
        AdmissionError::MissingFields(_) => {
            message(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string())
        }
        AdmissionError::Storage(source) => {
            error!(error = %source, "pre-enrollment storage failure");
            message(StatusCode::INTERNAL_SERVER_ERROR, STORAGE_FAILURE)
        }
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

/// Accept `{"id": 7}` as well as `{"id": "7"}`; the admin page sends either.
fn deserialize_applicant_id<'de, D>(deserializer: D) -> Result<ApplicantId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(ApplicantId(id)),
        RawId::Text(raw) => raw
            .trim()
            .parse::<i64>()
            .map(ApplicantId)
            .map_err(|_| serde::de::Error::custom(format!("'{raw}' is not a valid applicant id"))),
    }
}
