//! Twilio Programmable Messaging sender.
//!
//! Messages are submitted with one `POST /2010-04-01/Accounts/{sid}/Messages.json` call using
//! HTTP basic auth. On the WhatsApp channel both addresses carry the `whatsapp:` scheme.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::notifier::{MessageReceipt, NotificationSender, SendError};
use crate::config::{MessagingChannel, TwilioConfig};

const WHATSAPP_SCHEME: &str = "whatsapp:";

pub struct TwilioSender {
    config: TwilioConfig,
    client: Client,
}

impl TwilioSender {
    pub fn new(config: TwilioConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: TwilioConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    fn address(&self, number: &str) -> String {
        match self.config.channel {
            MessagingChannel::WhatsApp if !number.starts_with(WHATSAPP_SCHEME) => {
                format!("{WHATSAPP_SCHEME}{number}")
            }
            _ => number.to_string(),
        }
    }
}

impl std::fmt::Debug for TwilioSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSender")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorDocument {
    code: Option<i64>,
    message: String,
}

#[async_trait]
impl NotificationSender for TwilioSender {
    async fn send(&self, to: &str, body: &str) -> Result<MessageReceipt, SendError> {
        let from = self.address(&self.config.from);
        let to = self.address(to);
        let form = [("From", from.as_str()), ("To", to.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|err| SendError::Transport(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| SendError::Transport(err.to_string()))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<TwilioErrorDocument>(&text) {
                Ok(TwilioErrorDocument {
                    code: Some(code),
                    message,
                }) => format!("{message} (code {code})"),
                Ok(TwilioErrorDocument { message, .. }) => message,
                Err(_) => text,
            };
            warn!(%to, status = status.as_u16(), %detail, "twilio rejected message");
            return Err(SendError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let resource: MessageResource = serde_json::from_str(&text).map_err(|err| {
            SendError::Transport(format!("unexpected twilio response: {err}"))
        })?;
        info!(%to, sid = %resource.sid, "twilio message accepted");

        Ok(MessageReceipt {
            message_id: resource.sid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn config(api_base: String, channel: MessagingChannel, from: &str) -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from: from.to_string(),
            channel,
            api_base,
        }
    }

    type Captured = Arc<Mutex<Vec<(Option<String>, String)>>>;

    async fn spawn_provider(status: StatusCode, reply: serde_json::Value) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let sink = captured.clone();
        let app = Router::new().route(
            "/2010-04-01/Accounts/AC123/Messages.json",
            post(move |headers: HeaderMap, body: String| {
                let sink = sink.clone();
                let reply = reply.clone();
                async move {
                    let auth = headers
                        .get(axum::http::header::AUTHORIZATION)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    sink.lock().expect("capture mutex poisoned").push((auth, body));
                    (status, Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind provider");
        let addr = listener.local_addr().expect("provider addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("provider serves");
        });
        (format!("http://{addr}"), captured)
    }

    #[test]
    fn whatsapp_addresses_gain_scheme_once() {
        let sender = TwilioSender::new(config(
            "https://api.twilio.com".to_string(),
            MessagingChannel::WhatsApp,
            "whatsapp:+14155238886",
        ));
        assert_eq!(sender.address("+59175342309"), "whatsapp:+59175342309");
        assert_eq!(sender.address("whatsapp:+14155238886"), "whatsapp:+14155238886");
        assert_eq!(
            sender.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn sms_addresses_are_left_alone() {
        let sender = TwilioSender::new(config(
            "https://api.twilio.com/".to_string(),
            MessagingChannel::Sms,
            "+14155238886",
        ));
        assert_eq!(sender.address("+59175342309"), "+59175342309");
        assert!(!sender.messages_url().contains("//2010"));
    }

    #[tokio::test]
    async fn successful_send_returns_provider_sid() {
        let (base, captured) =
            spawn_provider(StatusCode::CREATED, json!({ "sid": "SM0001", "status": "queued" }))
                .await;
        let sender = TwilioSender::new(config(
            base,
            MessagingChannel::WhatsApp,
            "whatsapp:+14155238886",
        ));

        let receipt = sender
            .send("+59175342309", "Hola")
            .await
            .expect("send succeeds");
        assert_eq!(receipt.message_id, "SM0001");

        let requests = captured.lock().expect("capture mutex poisoned");
        assert_eq!(requests.len(), 1);
        let (auth, body) = &requests[0];
        assert!(auth.as_deref().unwrap_or_default().starts_with("Basic "));
        assert!(body.contains("To=whatsapp%3A%2B59175342309"));
        assert!(body.contains("From=whatsapp%3A%2B14155238886"));
        assert!(body.contains("Body=Hola"));
    }

    #[tokio::test]
    async fn rejected_send_carries_provider_detail() {
        let (base, _) = spawn_provider(
            StatusCode::BAD_REQUEST,
            json!({ "code": 21211, "message": "Invalid 'To' Phone Number", "status": 400 }),
        )
        .await;
        let sender = TwilioSender::new(config(base, MessagingChannel::Sms, "+14155238886"));

        match sender.send("+591000", "Hola").await {
            Err(SendError::Rejected { status, detail }) => {
                assert_eq!(status, 400);
                assert!(detail.contains("Invalid 'To' Phone Number"));
                assert!(detail.contains("21211"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind unused port");
        let addr = listener.local_addr().expect("unused port addr");
        drop(listener);

        let sender = TwilioSender::new(config(
            format!("http://{addr}"),
            MessagingChannel::Sms,
            "+14155238886",
        ));
        assert!(matches!(
            sender.send("+59175342309", "Hola").await,
            Err(SendError::Transport(_))
        ));
    }
}
