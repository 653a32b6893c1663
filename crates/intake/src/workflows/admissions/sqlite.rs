use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use super::domain::{AdmissionStatus, ApplicantId, ApplicantRecord, ApplicantSubmission};
use super::repository::{ApplicantRepository, RepositoryError};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS preinscripciones (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nombres TEXT,
        apellidos TEXT,
        ci TEXT,
        fecha_nac TEXT,
        genero TEXT,
        grado TEXT,
        direccion TEXT,
        telefono TEXT,
        email TEXT,
        procedencia TEXT,
        t_nombre TEXT,
        t_cel TEXT,
        t_parentezco TEXT,
        t_email TEXT,
        emergencia TEXT,
        estado TEXT DEFAULT 'pendiente'
    )";

const SELECT_COLUMNS: &str = "id, nombres, apellidos, ci, fecha_nac, genero, grado, direccion, \
     telefono, email, procedencia, t_nombre, t_cel, t_parentezco, t_email, emergencia, estado";

/// SQLite-backed store for pre-enrollment records.
///
/// The pool holds a single long-lived connection, so `sqlite::memory:` databases survive for the
/// lifetime of the repository.
#[derive(Debug, Clone)]
pub struct SqliteApplicantRepository {
    pool: SqlitePool,
}

impl SqliteApplicantRepository {
    /// Open (creating if needed) the database at `url` and ensure the table exists.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repository = Self { pool };
        repository.migrate().await?;
        info!(url, "pre-enrollment database ready");
        Ok(repository)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ApplicantRepository for SqliteApplicantRepository {
    async fn insert(
        &self,
        submission: ApplicantSubmission,
    ) -> Result<ApplicantRecord, RepositoryError> {
        let sql = format!(
            "INSERT INTO preinscripciones \
             (nombres, apellidos, ci, fecha_nac, genero, grado, direccion, telefono, email, \
              procedencia, t_nombre, t_cel, t_parentezco, t_email, emergencia, estado) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {SELECT_COLUMNS}"
        );

        let record = sqlx::query_as::<_, ApplicantRecord>(&sql)
            .bind(submission.given_names)
            .bind(submission.surnames)
            .bind(submission.national_id)
            .bind(submission.birth_date)
            .bind(submission.gender)
            .bind(submission.grade)
            .bind(submission.address)
            .bind(submission.phone)
            .bind(submission.email)
            .bind(submission.origin_school)
            .bind(submission.guardian.name)
            .bind(submission.guardian.phone)
            .bind(submission.guardian.relationship)
            .bind(submission.guardian.email)
            .bind(submission.emergency_contact)
            .bind(AdmissionStatus::Pending)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM preinscripciones ORDER BY id DESC");
        let records = sqlx::query_as::<_, ApplicantRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn fetch(&self, id: ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM preinscripciones WHERE id = ?");
        let record = sqlx::query_as::<_, ApplicantRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn phone_number(&self, id: ApplicantId) -> Result<Option<String>, RepositoryError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT telefono FROM preinscripciones WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(phone,)| phone.unwrap_or_default()))
    }

    async fn set_status(
        &self,
        id: ApplicantId,
        status: AdmissionStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE preinscripciones SET estado = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: ApplicantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM preinscripciones WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
