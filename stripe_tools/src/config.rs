use lm_common::Secret;
use log::*;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Base URL for the Stripe REST API. Only overridden in tests.
    pub api_base: String,
    pub secret_key: Secret<String>,
    pub webhook_secret: Secret<String>,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            secret_key: Secret::default(),
            webhook_secret: Secret::default(),
        }
    }
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_base = std::env::var("LM_STRIPE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let secret_key = Secret::new(std::env::var("LM_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            error!("💳️ LM_STRIPE_SECRET_KEY is not set. Stripe API calls will be rejected upstream.");
            String::default()
        }));
        let webhook_secret = Secret::new(std::env::var("LM_STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
            error!("💳️ LM_STRIPE_WEBHOOK_SECRET is not set. Incoming webhook events cannot be verified.");
            String::default()
        }));
        Self { api_base, secret_key, webhook_secret }
    }
}
