use std::fmt;

use serde::{Deserialize, Serialize};

/// Auto-assigned identifier of a pre-enrollment record. Never reused after deletion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ApplicantId(pub i64);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review state of a submission. Stored and serialized with the Spanish labels used by the
/// admin page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum AdmissionStatus {
    #[serde(rename = "pendiente")]
    #[sqlx(rename = "pendiente")]
    Pending,
    #[serde(rename = "aceptado")]
    #[sqlx(rename = "aceptado")]
    Accepted,
    #[serde(rename = "rechazado")]
    #[sqlx(rename = "rechazado")]
    Rejected,
}

impl AdmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Accepted => "aceptado",
            Self::Rejected => "rechazado",
        }
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Administrator verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Accept,
    Reject,
}

impl AdmissionDecision {
    pub const fn status(self) -> AdmissionStatus {
        match self {
            Self::Accept => AdmissionStatus::Accepted,
            Self::Reject => AdmissionStatus::Rejected,
        }
    }

    /// Fixed message delivered to the applicant's phone.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Accept => {
                "✅ Tu formulario para la inscripción al colegio Marcelino Champagnat fue aprobado. ¡Bienvenido!"
            }
            Self::Reject => {
                "❌ Tu formulario para la inscripción al colegio Marcelino Champagnat fue rechazado. Para más información, contacta a la institución."
            }
        }
    }
}

/// Fields captured by the public pre-enrollment form.
///
/// Every field is optional on the wire; [`ApplicantSubmission::missing_fields`] reports the ones
/// the school requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantSubmission {
    #[serde(rename = "nombres")]
    pub given_names: Option<String>,
    #[serde(rename = "apellidos")]
    pub surnames: Option<String>,
    #[serde(rename = "ci")]
    pub national_id: Option<String>,
    #[serde(rename = "fecha_nac")]
    pub birth_date: Option<String>,
    #[serde(rename = "genero")]
    pub gender: Option<String>,
    #[serde(rename = "grado")]
    pub grade: Option<String>,
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "procedencia")]
    pub origin_school: Option<String>,
    #[serde(flatten)]
    pub guardian: GuardianDetails,
    #[serde(rename = "emergencia")]
    pub emergency_contact: Option<String>,
}

impl ApplicantSubmission {
    /// Wire names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("nombres", &self.given_names),
            ("apellidos", &self.surnames),
            ("ci", &self.national_id),
            ("telefono", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Parent or guardian responsible for the applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct GuardianDetails {
    #[serde(rename = "t_nombre")]
    #[sqlx(rename = "t_nombre")]
    pub name: Option<String>,
    #[serde(rename = "t_cel")]
    #[sqlx(rename = "t_cel")]
    pub phone: Option<String>,
    #[serde(rename = "t_parentezco")]
    #[sqlx(rename = "t_parentezco")]
    pub relationship: Option<String>,
    #[serde(rename = "t_email")]
    #[sqlx(rename = "t_email")]
    pub email: Option<String>,
}

/// A stored pre-enrollment submission as listed on the admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ApplicantRecord {
    pub id: ApplicantId,
    #[serde(rename = "nombres")]
    #[sqlx(rename = "nombres")]
    pub given_names: Option<String>,
    #[serde(rename = "apellidos")]
    #[sqlx(rename = "apellidos")]
    pub surnames: Option<String>,
    #[serde(rename = "ci")]
    #[sqlx(rename = "ci")]
    pub national_id: Option<String>,
    #[serde(rename = "fecha_nac")]
    #[sqlx(rename = "fecha_nac")]
    pub birth_date: Option<String>,
    #[serde(rename = "genero")]
    #[sqlx(rename = "genero")]
    pub gender: Option<String>,
    #[serde(rename = "grado")]
    #[sqlx(rename = "grado")]
    pub grade: Option<String>,
    #[serde(rename = "direccion")]
    #[sqlx(rename = "direccion")]
    pub address: Option<String>,
    #[serde(rename = "telefono")]
    #[sqlx(rename = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "procedencia")]
    #[sqlx(rename = "procedencia")]
    pub origin_school: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub guardian: GuardianDetails,
    #[serde(rename = "emergencia")]
    #[sqlx(rename = "emergencia")]
    pub emergency_contact: Option<String>,
    #[serde(rename = "estado")]
    #[sqlx(rename = "estado")]
    pub status: AdmissionStatus,
}
