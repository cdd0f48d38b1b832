//! Outbound email: the provider seam and its Resend implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Write-only message handed to the provider. `attachments` is skipped on
/// the wire when `None`.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    /// Base64 payload, standard alphabet.
    pub content: String,
}

/// Provider acknowledgment. The id is logged, never returned to clients.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub message_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("email request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("{0}")]
    Provider(String),
}

/// Delivery abstraction so the intake routes can be exercised without
/// network traffic.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendReceipt, MailerError>;
}

/// Resend HTTP API client. No explicit timeout is imposed; the transport
/// defaults of the underlying client apply.
pub struct ResendMailer {
    http_client: reqwest::Client,
    api_key: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MailerError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(MailerError::Client)?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendReceipt, MailerError> {
        let response = self
            .http_client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(MailerError::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<ProviderErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("email provider returned {status}"));
            return Err(MailerError::Provider(detail));
        }

        let body: SendResponse = response.json().await.map_err(MailerError::Transport)?;
        Ok(SendReceipt {
            message_id: body.id,
        })
    }
}
