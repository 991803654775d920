//! Client for a Brevo-style transactional email API.
//!
//! The agent only ever reaches this through the send-email tool, after the
//! two-phase consent handshake. Credentials live here, configured at startup;
//! the model never supplies them.

use std::time::Duration;

use base64::Engine;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const MAX_ATTEMPTS: u32 = 3;
const ATTACHMENT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("No valid recipient addresses provided.")]
    NoRecipients,
    #[error("Invalid attachments JSON: {0}")]
    InvalidAttachments(String),
    #[error("email transport error: {0}")]
    Transport(String),
    #[error("email API error (status={status}): {message}")]
    Api { status: u16, message: String },
    #[error("Unable to send email after retries.")]
    RetriesExhausted,
}

/// The exact approved draft fields, echoed from the consent phase.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SendRequest {
    pub to_emails: String,
    pub subject: String,
    pub body: String,
    #[serde(default = "empty_attachments")]
    pub attachments_json: String,
}

fn empty_attachments() -> String {
    "[]".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: String,
}

#[derive(Clone)]
pub struct Mailer {
    base_url: String,
    api_key: Secret<String>,
    sender_email: String,
    sender_name: String,
    backoff: Duration,
    http: reqwest::Client,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("sender_email", &self.sender_email)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct MailerBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    sender_email: Option<String>,
    sender_name: Option<String>,
    backoff: Option<Duration>,
}

impl Mailer {
    pub fn builder() -> MailerBuilder {
        MailerBuilder::default()
    }
}

impl MailerBuilder {
    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = Some(value.into());
        self
    }

    pub fn sender_email(mut self, value: impl Into<String>) -> Self {
        self.sender_email = Some(value.into());
        self
    }

    pub fn sender_name(mut self, value: impl Into<String>) -> Self {
        self.sender_name = Some(value.into());
        self
    }

    /// Override the API endpoint (tests point this at a local mock).
    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = Some(value.into());
        self
    }

    /// Initial retry backoff; doubles after each retried attempt.
    pub fn backoff(mut self, value: Duration) -> Self {
        self.backoff = Some(value);
        self
    }

    pub fn build(self) -> Result<Mailer, MailError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| MailError::Transport("mail API key is not configured".to_string()))?;
        let sender_email = self
            .sender_email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| MailError::Transport("sender email is not configured".to_string()))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| MailError::Transport(err.to_string()))?;

        Ok(Mailer {
            base_url: self
                .base_url
                .unwrap_or_else(|| "https://api.brevo.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: Secret::new(api_key),
            sender_email,
            sender_name: self.sender_name.unwrap_or_else(|| "Invoice Agent".to_string()),
            http,
            backoff: self.backoff.unwrap_or(Duration::from_secs(1)),
        })
    }
}

#[derive(Serialize)]
struct EmailPayload {
    sender: SenderPayload,
    to: Vec<RecipientPayload>,
    subject: String,
    #[serde(rename = "textContent")]
    text_content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachment: Vec<AttachmentPayload>,
}

#[derive(Serialize)]
struct SenderPayload {
    email: String,
    name: String,
}

#[derive(Serialize)]
struct RecipientPayload {
    email: String,
}

#[derive(Serialize)]
struct AttachmentPayload {
    name: String,
    content: String,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(rename = "messageId", default)]
    message_id: Option<String>,
}

impl Mailer {
    /// Sends a plain-text email, downloading and base64-encoding each
    /// attachment first. Attachment fetch failures are skipped with a
    /// warning; transient API failures (429/5xx) are retried up to three
    /// times with doubling backoff.
    pub async fn send(&self, request: &SendRequest) -> Result<SendReceipt, MailError> {
        tracing::info!(to = %request.to_emails, "preparing email send");

        let recipients: Vec<RecipientPayload> = request
            .to_emails
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(|address| RecipientPayload {
                email: address.to_string(),
            })
            .collect();
        if recipients.is_empty() {
            return Err(MailError::NoRecipients);
        }

        let attachments = self.fetch_attachments(&request.attachments_json).await?;

        let payload = EmailPayload {
            sender: SenderPayload {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: recipients,
            subject: request.subject.clone(),
            text_content: request.body.clone(),
            attachment: attachments,
        };

        let url = format!("{}/v3/smtp/email", self.base_url);
        let mut backoff = self.backoff;
        for attempt in 1..=MAX_ATTEMPTS {
            let response = self
                .http
                .post(&url)
                .header("api-key", self.api_key.expose_secret())
                .json(&payload)
                .send()
                .await
                .map_err(|err| MailError::Transport(err.to_string()))?;

            let status = response.status();
            if status.is_success() {
                let parsed: SendResponse = response
                    .json()
                    .await
                    .map_err(|err| MailError::Transport(err.to_string()))?;
                let message_id = parsed.message_id.unwrap_or_default();
                tracing::info!(message_id = %message_id, "email sent successfully");
                return Ok(SendReceipt { message_id });
            }

            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "email API error");
            let transient = status.as_u16() == 429 || status.is_server_error();
            if transient && attempt < MAX_ATTEMPTS {
                tracing::info!(
                    attempt,
                    backoff_secs = backoff.as_secs(),
                    "retrying email send"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                continue;
            }
            if transient {
                return Err(MailError::RetriesExhausted);
            }
            return Err(MailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Err(MailError::RetriesExhausted)
    }

    async fn fetch_attachments(
        &self,
        attachments_json: &str,
    ) -> Result<Vec<AttachmentPayload>, MailError> {
        let parsed: Value = serde_json::from_str(attachments_json)
            .map_err(|err| MailError::InvalidAttachments(err.to_string()))?;
        let Value::Array(entries) = parsed else {
            return Err(MailError::InvalidAttachments(
                "Expected a list of attachments".to_string(),
            ));
        };

        let mut attachments = Vec::new();
        for entry in entries {
            let (Some(url), Some(filename)) = (
                entry.get("url").and_then(Value::as_str),
                entry.get("filename").and_then(Value::as_str),
            ) else {
                tracing::warn!(entry = %entry, "skipping malformed attachment entry");
                continue;
            };
            match self.download(url).await {
                Ok(bytes) => {
                    attachments.push(AttachmentPayload {
                        name: filename.to_string(),
                        content: base64::engine::general_purpose::STANDARD.encode(bytes),
                    });
                    tracing::info!(filename, "attachment ready");
                }
                Err(error) => {
                    tracing::warn!(filename, error = %error, "failed to fetch attachment, skipping");
                }
            }
        }
        Ok(attachments)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, MailError> {
        let response = self
            .http
            .get(url)
            .timeout(ATTACHMENT_TIMEOUT)
            .send()
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| MailError::Transport(err.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}
