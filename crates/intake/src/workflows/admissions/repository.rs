use async_trait::async_trait;

use super::domain::{AdmissionStatus, ApplicantId, ApplicantRecord, ApplicantSubmission};

/// Storage abstraction so the service module can be exercised in isolation.
#[async_trait]
pub trait ApplicantRepository: Send + Sync {
    /// Store a new submission with status `pendiente` and return the stored row.
    async fn insert(
        &self,
        submission: ApplicantSubmission,
    ) -> Result<ApplicantRecord, RepositoryError>;
    /// Every record, newest first.
    async fn list(&self) -> Result<Vec<ApplicantRecord>, RepositoryError>;
    async fn fetch(&self, id: ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError>;
    /// Phone number on file; `Ok(None)` when no record matches. A record stored without a phone
    /// yields an empty string.
    async fn phone_number(&self, id: ApplicantId) -> Result<Option<String>, RepositoryError>;
    /// Fails with [`RepositoryError::NotFound`] when no row was updated.
    async fn set_status(
        &self,
        id: ApplicantId,
        status: AdmissionStatus,
    ) -> Result<(), RepositoryError>;
    /// Hard delete. Fails with [`RepositoryError::NotFound`] when no row was removed.
    async fn delete(&self, id: ApplicantId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Unavailable(other.to_string()),
        }
    }
}
