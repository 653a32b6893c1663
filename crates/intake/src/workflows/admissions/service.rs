use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    AdmissionDecision, AdmissionStatus, ApplicantId, ApplicantRecord, ApplicantSubmission,
};
use super::notifier::{NotificationSender, SendError};
use super::phone::normalize_phone;
use super::repository::{ApplicantRepository, RepositoryError};

/// Service composing the applicant store and the outbound notifier.
pub struct AdmissionService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    country_code: String,
}

/// Result of an accept/reject action. The status write is committed in both variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Notified {
        id: ApplicantId,
        status: AdmissionStatus,
        recipient: String,
        message_id: String,
    },
    /// The new status is persisted but the applicant was not reached.
    DeliveryFailed {
        id: ApplicantId,
        status: AdmissionStatus,
        recipient: String,
        error: SendError,
    },
}

impl AdmissionOutcome {
    pub fn id(&self) -> ApplicantId {
        match self {
            Self::Notified { id, .. } | Self::DeliveryFailed { id, .. } => *id,
        }
    }

    pub fn status(&self) -> AdmissionStatus {
        match self {
            Self::Notified { status, .. } | Self::DeliveryFailed { status, .. } => *status,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Self::Notified { recipient, .. } | Self::DeliveryFailed { recipient, .. } => recipient,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Notified { .. })
    }
}

impl<R, N> AdmissionService<R, N>
where
    R: ApplicantRepository + 'static,
    N: NotificationSender + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, country_code: impl Into<String>) -> Self {
        Self {
            repository,
            notifier,
            country_code: country_code.into(),
        }
    }

    /// Store a public form submission as a new `pendiente` record.
    pub async fn submit(
        &self,
        submission: ApplicantSubmission,
    ) -> Result<ApplicantRecord, AdmissionError> {
        let missing = submission.missing_fields();
        if !missing.is_empty() {
            return Err(AdmissionError::MissingFields(missing));
        }

        let record = self.repository.insert(submission).await?;
        info!(id = %record.id, "pre-enrollment submission stored");
        Ok(record)
    }

    /// Every record, newest first.
    pub async fn list(&self) -> Result<Vec<ApplicantRecord>, AdmissionError> {
        Ok(self.repository.list().await?)
    }

    pub async fn get(&self, id: ApplicantId) -> Result<ApplicantRecord, AdmissionError> {
        self.repository
            .fetch(id)
            .await?
            .ok_or(AdmissionError::NotFound(id))
    }

    /// Persist the decision, then notify the applicant.
    ///
    /// A failed send never rolls back the status write; it is reported as
    /// [`AdmissionOutcome::DeliveryFailed`].
    pub async fn decide(
        &self,
        id: ApplicantId,
        decision: AdmissionDecision,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        let phone = self
            .repository
            .phone_number(id)
            .await?
            .ok_or(AdmissionError::NotFound(id))?;
        let recipient = normalize_phone(&phone, &self.country_code);

        let status = decision.status();
        self.repository
            .set_status(id, status)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => AdmissionError::NotFound(id),
                other => AdmissionError::Storage(other),
            })?;
        info!(%id, %status, "admission status updated");

        match self.notifier.send(&recipient, decision.message()).await {
            Ok(receipt) => {
                info!(%id, message_id = %receipt.message_id, "applicant notified");
                Ok(AdmissionOutcome::Notified {
                    id,
                    status,
                    recipient,
                    message_id: receipt.message_id,
                })
            }
            Err(error) => {
                warn!(%id, %status, %error, "status committed but notification failed");
                Ok(AdmissionOutcome::DeliveryFailed {
                    id,
                    status,
                    recipient,
                    error,
                })
            }
        }
    }

    /// Irreversibly remove a record.
    pub async fn delete(&self, id: ApplicantId) -> Result<(), AdmissionError> {
        self.repository.delete(id).await.map_err(|err| match err {
            RepositoryError::NotFound => AdmissionError::NotFound(id),
            other => AdmissionError::Storage(other),
        })?;
        info!(%id, "pre-enrollment record deleted");
        Ok(())
    }
}

/// Error raised by the admission service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("applicant {0} not found")]
    NotFound(ApplicantId),
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}
