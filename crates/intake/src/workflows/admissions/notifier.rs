use async_trait::async_trait;
use serde::Serialize;

/// Provider acknowledgement for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageReceipt {
    pub message_id: String,
}

/// Outbound text-message hook (e.g., Twilio WhatsApp or SMS adapters).
///
/// `to` is expected to be normalized already. Implementations make exactly one attempt.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<MessageReceipt, SendError>;
}

/// Delivery failure reported by a [`NotificationSender`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("notification transport failed: {0}")]
    Transport(String),
    #[error("notification provider rejected the message ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    #[error("notification provider is not configured")]
    NotConfigured,
}

/// Sender used when no provider credentials are configured. Every send fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSender;

#[async_trait]
impl NotificationSender for DisabledSender {
    async fn send(&self, to: &str, _body: &str) -> Result<MessageReceipt, SendError> {
        tracing::warn!(to, "notification skipped: provider not configured");
        Err(SendError::NotConfigured)
    }
}
