use lm_common::Secret;
use log::*;

#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    /// Backend identifier: "postmark", "brevo", "sendgrid", or "disabled".
    pub provider: String,
    pub api_key: Secret<String>,
    /// Sender address the backend sends from.
    pub sender: String,
}

impl MailConfig {
    pub fn new_from_env_or_default() -> Self {
        let provider = std::env::var("LM_EMAIL_PROVIDER").unwrap_or_else(|_| {
            info!("✉️ LM_EMAIL_PROVIDER not set. Transactional email is disabled.");
            "disabled".to_string()
        });
        let api_key = Secret::new(std::env::var("LM_EMAIL_API_KEY").unwrap_or_default());
        let sender = std::env::var("LM_EMAIL_FROM").unwrap_or_default();
        Self { provider: provider.trim().to_lowercase(), api_key, sender }
    }
}
