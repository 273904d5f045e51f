//! Outbound mail collaborator
//!
//! Contact submissions notify the site owner and optionally auto-reply to
//! the sender. Delivery goes through an HTTP mail provider as a single JSON
//! POST; `NoopMailer` stands in when sending is disabled or unconfigured.
//!
//! The mailer never retries. The contact handler owns the
//! save-then-best-effort-notify ordering and treats every error here as
//! non-fatal.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::MailConfig;

/// A single outbound message.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Provider-assigned message identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected the message: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("Mailer not configured: {0}")]
    NotConfigured(&'static str),
}

/// Outbound mail boundary consumed by the handlers.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, envelope: &Envelope) -> Result<MessageId, MailError>;

    /// Cheap connectivity check against the provider.
    async fn verify(&self) -> Result<(), MailError>;
}

/// Mailer speaking a JSON HTTP mail-provider API.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        if config.api_url.is_empty() {
            return Err(MailError::NotConfigured("mail.api_url is empty"));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("portfolio-api/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, envelope: &Envelope) -> Result<MessageId, MailError> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": [envelope.to],
            "reply_to": envelope.reply_to,
            "subject": envelope.subject,
            "text": envelope.text,
        });

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let id = body
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        tracing::debug!(message_id = %id, to = %envelope.to, "Mail accepted by provider");
        Ok(MessageId(id))
    }

    async fn verify(&self) -> Result<(), MailError> {
        let response = self
            .client
            .get(self.api_url.as_str())
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status().is_server_error() {
            return Err(MailError::Rejected {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }

        Ok(())
    }
}

/// Mailer used when sending is disabled; accepts everything without I/O.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, envelope: &Envelope) -> Result<MessageId, MailError> {
        tracing::debug!(
            to = %envelope.to,
            subject = %envelope.subject,
            "Mail sending disabled, dropping message"
        );
        Ok(MessageId("disabled".to_string()))
    }

    async fn verify(&self) -> Result<(), MailError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mail_config(api_url: &str) -> MailConfig {
        MailConfig {
            enabled: true,
            api_url: api_url.to_string(),
            api_key: "test-key".to_string(),
            from: "Portfolio <no-reply@site.example>".to_string(),
            owner_email: "owner@site.example".to_string(),
            owner_name: "Owner".to_string(),
        }
    }

    fn envelope() -> Envelope {
        Envelope {
            to: "owner@site.example".to_string(),
            reply_to: Some("visitor@elsewhere.example".to_string()),
            subject: "hello".to_string(),
            text: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn send_posts_the_envelope_and_returns_the_provider_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "from": "Portfolio <no-reply@site.example>",
                "to": ["owner@site.example"],
                "subject": "hello",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "msg_1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mailer = HttpMailer::new(&mail_config(&server.uri())).unwrap();
        let id = mailer.send(&envelope()).await.unwrap();
        assert_eq!(id, MessageId("msg_1".to_string()));
    }

    #[tokio::test]
    async fn send_surfaces_provider_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad recipient"))
            .mount(&server)
            .await;

        let mailer = HttpMailer::new(&mail_config(&server.uri())).unwrap();
        let err = mailer.send(&envelope()).await.unwrap_err();
        match err {
            MailError::Rejected { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad recipient");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn verify_passes_on_any_non_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mailer = HttpMailer::new(&mail_config(&server.uri())).unwrap();
        assert!(mailer.verify().await.is_ok());
    }

    #[tokio::test]
    async fn new_requires_an_api_url() {
        let mut config = mail_config("");
        config.api_url.clear();
        assert!(matches!(
            HttpMailer::new(&config),
            Err(MailError::NotConfigured(_))
        ));
    }
}
