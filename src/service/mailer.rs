//! SMTP mail transport behind an injectable seam
//!
//! The transport is built once at startup from explicit configuration and
//! handed to the dispatch pipeline; there is no shared mutable transport
//! state.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use url::Url;
use uuid::Uuid;

use crate::model::SmtpConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Invalid mailbox address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// A rendered outbound email
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to_name: String,
    pub to_address: String,
    pub subject: String,
    pub body: String,
}

/// Receipt for a sent message. `preview_url` is populated when the
/// configured mailbox exposes a web preview for sent messages.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub message_id: String,
    pub preview_url: Option<String>,
}

/// Sending seam used by the dispatch pipeline
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailerError>;
}

/// Mailer over lettre's async SMTP transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    preview_base_url: Option<Url>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|_| MailerError::Address(config.from_address.clone()))?;

        tracing::info!(host = %config.host, port = config.port, from = %config.from_address, "SMTP transport configured");

        Ok(Self {
            transport: builder.build(),
            from,
            preview_base_url: config.preview_base_url.clone(),
        })
    }

    fn preview_url_for(&self, message_id: &str) -> Option<String> {
        let base = self.preview_base_url.as_ref()?;
        let id = message_id.trim_matches(|c| c == '<' || c == '>');
        Some(format!("{}message/{}", base, id))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailerError> {
        let to: Mailbox = format!("{} <{}>", email.to_name, email.to_address)
            .parse()
            .map_err(|_| MailerError::Address(email.to_address.clone()))?;

        let message_id = format!("<{}@rfpflow>", Uuid::new_v4());

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| MailerError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        tracing::info!(to = %email.to_address, "Email sent");

        Ok(SendReceipt {
            preview_url: self.preview_url_for(&message_id),
            message_id,
        })
    }
}
