use async_trait::async_trait;
use intake::config::NotifierConfig;
use intake::workflows::admissions::{
    DisabledSender, MessageReceipt, NotificationSender, SendError, TwilioSender,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Notifier selected at start-up from the provider settings.
#[derive(Debug)]
pub(crate) enum Notifier {
    Twilio(TwilioSender),
    Disabled(DisabledSender),
}

impl Notifier {
    pub(crate) fn from_config(config: &NotifierConfig) -> Self {
        match &config.twilio {
            Some(twilio) => Self::Twilio(TwilioSender::new(twilio.clone())),
            None => {
                warn!("twilio credentials missing; applicant notifications are disabled");
                Self::Disabled(DisabledSender)
            }
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        matches!(self, Self::Twilio(_))
    }
}

#[async_trait]
impl NotificationSender for Notifier {
    async fn send(&self, to: &str, body: &str) -> Result<MessageReceipt, SendError> {
        match self {
            Self::Twilio(sender) => sender.send(to, body).await,
            Self::Disabled(sender) => sender.send(to, body).await,
        }
    }
}
