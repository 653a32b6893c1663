use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{auth_router, AdminAuth, AdminCredentials, SessionStore};
use crate::workflows::admissions::domain::{
    AdmissionStatus, ApplicantId, ApplicantRecord, ApplicantSubmission,
};
use crate::workflows::admissions::notifier::{MessageReceipt, NotificationSender, SendError};
use crate::workflows::admissions::repository::{ApplicantRepository, RepositoryError};
use crate::workflows::admissions::{admission_router, AdmissionService};

pub(super) const COUNTRY_CODE: &str = "591";

pub(super) fn submission() -> ApplicantSubmission {
    ApplicantSubmission {
        given_names: Some("Ana".to_string()),
        surnames: Some("Quispe Mamani".to_string()),
        national_id: Some("8765432".to_string()),
        birth_date: Some("2015-03-14".to_string()),
        gender: Some("F".to_string()),
        grade: Some("4to primaria".to_string()),
        address: Some("Av. Ballivián 123".to_string()),
        phone: Some("75342309".to_string()),
        email: Some("ana@example.com".to_string()),
        origin_school: Some("U.E. San José".to_string()),
        emergency_contact: Some("71234567".to_string()),
        ..ApplicantSubmission::default()
    }
}

pub(super) fn submission_with_phone(phone: &str) -> ApplicantSubmission {
    ApplicantSubmission {
        phone: Some(phone.to_string()),
        ..submission()
    }
}

pub(super) fn build_service<N>(
    notifier: N,
) -> (
    AdmissionService<MemoryRepository, N>,
    Arc<MemoryRepository>,
    Arc<N>,
)
where
    N: NotificationSender + 'static,
{
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(notifier);
    let service = AdmissionService::new(repository.clone(), notifier.clone(), COUNTRY_CODE);
    (service, repository, notifier)
}

pub(super) fn admin_auth() -> Arc<AdminAuth> {
    Arc::new(AdminAuth::new(
        AdminCredentials::new("admin", "12345"),
        SessionStore::new(Duration::hours(1)),
    ))
}

pub(super) fn app<R, N>(service: AdmissionService<R, N>, auth: Arc<AdminAuth>) -> Router
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    admission_router(Arc::new(service), auth.clone()).merge(auth_router(auth))
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    body: Value,
    cookie: Option<&str>,
) -> Request<axum::body::Body> {
    raw_request(method, uri, &body.to_string(), cookie)
}

/// JSON-typed request carrying `body` verbatim, for payloads `Value` cannot express.
pub(super) fn raw_request(
    method: &str,
    uri: &str,
    body: &str,
    cookie: Option<&str>,
) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

/// Log in through the router and return the `name=value` pair of the session cookie.
pub(super) async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({ "username": "admin", "password": "12345" }),
            None,
        ))
        .await
        .expect("login executes");
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("session cookie set");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair present")
        .to_string()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<BTreeMap<ApplicantId, ApplicantRecord>>,
    last_id: Mutex<i64>,
    failing_writes: AtomicBool,
}

impl MemoryRepository {
    pub(super) fn status_of(&self, id: ApplicantId) -> Option<AdmissionStatus> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&id)
            .map(|record| record.status)
    }

    pub(super) fn fail_status_writes(&self) {
        self.failing_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ApplicantRepository for MemoryRepository {
    async fn insert(
        &self,
        submission: ApplicantSubmission,
    ) -> Result<ApplicantRecord, RepositoryError> {
        let mut last_id = self.last_id.lock().expect("id mutex poisoned");
        *last_id += 1;
        let record = ApplicantRecord {
            id: ApplicantId(*last_id),
            given_names: submission.given_names,
            surnames: submission.surnames,
            national_id: submission.national_id,
            birth_date: submission.birth_date,
            gender: submission.gender,
            grade: submission.grade,
            address: submission.address,
            phone: submission.phone,
            email: submission.email,
            origin_school: submission.origin_school,
            guardian: submission.guardian,
            emergency_contact: submission.emergency_contact,
            status: AdmissionStatus::Pending,
        };
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().rev().cloned().collect())
    }

    async fn fetch(&self, id: ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    async fn phone_number(&self, id: ApplicantId) -> Result<Option<String>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(&id)
            .map(|record| record.phone.clone().unwrap_or_default()))
    }

    async fn set_status(
        &self,
        id: ApplicantId,
        status: AdmissionStatus,
    ) -> Result<(), RepositoryError> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("disk I/O error".to_string()));
        }
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&id) {
            Some(record) => {
                record.status = status;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: ApplicantId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl ApplicantRepository for UnavailableRepository {
    async fn insert(
        &self,
        _submission: ApplicantSubmission,
    ) -> Result<ApplicantRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn list(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch(&self, _id: ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn phone_number(&self, _id: ApplicantId) -> Result<Option<String>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn set_status(
        &self,
        _id: ApplicantId,
        _status: AdmissionStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn delete(&self, _id: ApplicantId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Notifier double that records every message and acknowledges it.
#[derive(Default)]
pub(super) struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSender {
    pub(super) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("sender mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, to: &str, body: &str) -> Result<MessageReceipt, SendError> {
        let mut sent = self.sent.lock().expect("sender mutex poisoned");
        sent.push((to.to_string(), body.to_string()));
        Ok(MessageReceipt {
            message_id: format!("SM{:04}", sent.len()),
        })
    }
}

/// Notifier double whose provider rejects every message.
#[derive(Default)]
pub(super) struct FailingSender {
    attempts: Mutex<Vec<String>>,
}

impl FailingSender {
    pub(super) fn attempts(&self) -> Vec<String> {
        self.attempts.lock().expect("sender mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationSender for FailingSender {
    async fn send(&self, to: &str, _body: &str) -> Result<MessageReceipt, SendError> {
        self.attempts
            .lock()
            .expect("sender mutex poisoned")
            .push(to.to_string());
        Err(SendError::Rejected {
            status: 400,
            detail: "Invalid 'To' Phone Number".to_string(),
        })
    }
}
