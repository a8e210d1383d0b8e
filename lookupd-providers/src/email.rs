//! Transactional email via the MailerSend API.
//!
//! One upstream request per recipient; invalid or failing recipients are
//! skipped, and delivery only counts as failed when no recipient got a
//! message.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use lookupd_core::{LookupError, Result};

/// MailerSend client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Base URL of the MailerSend API
    pub base_url: String,
    /// MailerSend API key (Bearer token)
    pub api_key: Option<String>,
    /// Request timeout in seconds, covering the whole batch
    pub timeout_seconds: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mailersend.com".into(),
            api_key: None,
            timeout_seconds: 60,
        }
    }
}

/// An outgoing email.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Subject line
    pub subject: String,
    /// HTML body
    pub body_html: String,
    /// Sender address
    pub sender: String,
    /// Recipient addresses; each gets its own message
    pub recipients: Vec<String>,
}

/// Client for the MailerSend email API.
pub struct MailerClient {
    config: MailerConfig,
    http_client: reqwest::Client,
}

impl MailerClient {
    /// Creates a new MailerSend client.
    pub fn with_config(config: MailerConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Sends `message` to each recipient individually.
    ///
    /// Returns the `x-message-id` values MailerSend assigned, one per
    /// accepted recipient. Fails only when every recipient was skipped or
    /// rejected.
    #[instrument(skip(self, message), fields(recipients = message.recipients.len()))]
    pub async fn send(&self, message: &EmailMessage) -> Result<Vec<String>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingApiKey("MailerSend"))?;

        let url = format!("{}/v1/email", self.config.base_url);
        let mut message_ids = Vec::new();

        for recipient in &message.recipients {
            if !is_valid_address(recipient) {
                warn!(%recipient, "skipping invalid recipient address");
                continue;
            }

            let body = serde_json::json!({
                "from": { "email": message.sender },
                "to": [{ "email": recipient }],
                "subject": message.subject,
                "html": message.body_html,
            });

            let response = match self
                .http_client
                .post(&url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(%recipient, error = %e, "failed to send email");
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(%recipient, status = status.as_u16(), body, "MailerSend rejected message");
                continue;
            }

            let message_id = response
                .headers()
                .get("x-message-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            message_ids.push(message_id);
        }

        if message_ids.is_empty() {
            return Err(LookupError::EmailDeliveryFailed);
        }

        info!(sent = message_ids.len(), "emails dispatched");
        Ok(message_ids)
    }
}

/// Checks that an address has the `local@domain.tld` shape.
///
/// Intentionally conservative: one `@`, non-empty local part, a dotted
/// domain, and no whitespace.
pub fn is_valid_address(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
