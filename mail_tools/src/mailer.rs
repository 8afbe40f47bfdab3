use std::{sync::Arc, time::Duration};

use lm_common::Secret;
use log::*;
use reqwest::Client;
use serde_json::json;

use crate::{config::MailConfig, error::MailError};

const POSTMARK_URL: &str = "https://api.postmarkapp.com/email";
const BREVO_URL: &str = "https://api.brevo.com/v3/smtp/email";
const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The outbound notification capability. Implementations translate the uniform call into one backend's wire
/// format; a `Result` comes back in every case, so notification failures stay visible and recoverable at the
/// call site.
#[allow(async_fn_in_trait)]
pub trait MailSender {
    async fn send(&self, to: &str, subject: &str, html: &str, text: Option<&str>) -> Result<(), MailError>;
}

/// The closed set of supported backends. Constructed once at startup via [`Mailer::from_config`] and shared
/// read-only thereafter.
#[derive(Clone)]
pub enum Mailer {
    /// Always succeeds and sends nothing. Substituted whenever the configuration is absent or incomplete.
    Disabled,
    Postmark(Backend),
    Brevo(Backend),
    Sendgrid(Backend),
}

#[derive(Clone)]
pub struct Backend {
    api_key: Secret<String>,
    sender: String,
    client: Arc<Client>,
}

impl Mailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        if config.provider == "disabled" {
            return Ok(Self::Disabled);
        }
        if config.api_key.reveal().is_empty() || config.sender.is_empty() {
            warn!(
                "✉️ Mail provider '{}' was requested, but LM_EMAIL_API_KEY or LM_EMAIL_FROM is missing. Falling \
                 back to the disabled backend.",
                config.provider
            );
            return Ok(Self::Disabled);
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailError::Initialization(e.to_string()))?;
        let backend =
            Backend { api_key: config.api_key.clone(), sender: config.sender.clone(), client: Arc::new(client) };
        match config.provider.as_str() {
            "postmark" => Ok(Self::Postmark(backend)),
            "brevo" => Ok(Self::Brevo(backend)),
            "sendgrid" => Ok(Self::Sendgrid(backend)),
            other => {
                warn!("✉️ Unknown mail provider '{other}'. Falling back to the disabled backend.");
                Ok(Self::Disabled)
            },
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Postmark(_) => "postmark",
            Self::Brevo(_) => "brevo",
            Self::Sendgrid(_) => "sendgrid",
        }
    }
}

impl MailSender for Mailer {
    async fn send(&self, to: &str, subject: &str, html: &str, text: Option<&str>) -> Result<(), MailError> {
        match self {
            Self::Disabled => {
                debug!("✉️ Mail is disabled. Dropping message to {to} ('{subject}')");
                Ok(())
            },
            Self::Postmark(b) => b.send_postmark(to, subject, html, text).await,
            Self::Brevo(b) => b.send_brevo(to, subject, html, text).await,
            Self::Sendgrid(b) => b.send_sendgrid(to, subject, html, text).await,
        }
    }
}

impl Backend {
    async fn send_postmark(&self, to: &str, subject: &str, html: &str, text: Option<&str>) -> Result<(), MailError> {
        let body = json!({
            "From": self.sender,
            "To": to,
            "Subject": subject,
            "HtmlBody": html,
            "TextBody": text.unwrap_or(""),
            "MessageStream": "outbound",
        });
        let response = self
            .client
            .post(POSTMARK_URL)
            .header("Accept", "application/json")
            .header("X-Postmark-Server-Token", self.api_key.reveal().as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::RequestError(e.to_string()))?;
        check_response(response).await
    }

    async fn send_brevo(&self, to: &str, subject: &str, html: &str, text: Option<&str>) -> Result<(), MailError> {
        let body = json!({
            "sender": { "email": self.sender },
            "to": [{ "email": to }],
            "subject": subject,
            "htmlContent": html,
            "textContent": text.unwrap_or(""),
        });
        let response = self
            .client
            .post(BREVO_URL)
            .header("accept", "application/json")
            .header("api-key", self.api_key.reveal().as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::RequestError(e.to_string()))?;
        check_response(response).await
    }

    async fn send_sendgrid(&self, to: &str, subject: &str, html: &str, _text: Option<&str>) -> Result<(), MailError> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": to }], "subject": subject }],
            "from": { "email": self.sender },
            "content": [{ "type": "text/html", "value": html }],
        });
        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(self.api_key.reveal())
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::RequestError(e.to_string()))?;
        check_response(response).await
    }
}

async fn check_response(response: reqwest::Response) -> Result<(), MailError> {
    if response.status().is_success() {
        trace!("✉️ Mail backend accepted the message. {}", response.status());
        return Ok(());
    }
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_else(|e| format!("(unreadable response body: {e})"));
    Err(MailError::Rejected { status, message })
}
