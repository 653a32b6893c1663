//! Pre-enrollment intake and the admission decision workflow.
//!
//! Public submissions land as `pendiente` records. An administrator accepts or rejects them,
//! which commits the new status first and then notifies the applicant by text message. A failed
//! notification is surfaced to the caller but never undoes the status change.

pub mod domain;
pub mod notifier;
pub mod phone;
pub mod repository;
pub mod router;
pub mod service;
pub mod sqlite;
pub mod twilio;

#[cfg(test)]
mod tests;

pub use domain::{
    AdmissionDecision, AdmissionStatus, ApplicantId, ApplicantRecord, ApplicantSubmission,
    GuardianDetails,
};
pub use notifier::{DisabledSender, MessageReceipt, NotificationSender, SendError};
pub use phone::normalize_phone;
pub use repository::{ApplicantRepository, RepositoryError};
pub use router::{admission_router, ApplicantAction};
pub use service::{AdmissionError, AdmissionOutcome, AdmissionService};
pub use sqlite::SqliteApplicantRepository;
pub use twilio::TwilioSender;
