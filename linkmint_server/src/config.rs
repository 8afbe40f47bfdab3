use std::env;

use lm_common::Secret;
use log::*;
use mail_tools::MailConfig;
use stripe_tools::{CheckoutUrls, StripeConfig};

use crate::preview::DEFAULT_PREVIEW_MAX_AGE_SECONDS;

const DEFAULT_LM_HOST: &str = "127.0.0.1";
const DEFAULT_LM_PORT: u16 = 8000;
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL of this deployment. Used to derive the default redirect templates.
    pub base_url: String,
    /// Success/cancel URL templates for checkout sessions.
    pub checkout_urls: CheckoutUrls,
    pub preview: PreviewConfig,
    /// Stripe API + webhook configuration
    pub stripe: StripeConfig,
    /// Transactional mail backend configuration
    pub mail: MailConfig,
}

#[derive(Clone, Debug)]
pub struct PreviewConfig {
    pub secret: Secret<String>,
    pub max_age_seconds: i64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { secret: Secret::new("change_me".to_string()), max_age_seconds: DEFAULT_PREVIEW_MAX_AGE_SECONDS }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LM_HOST.to_string(),
            port: DEFAULT_LM_PORT,
            base_url: DEFAULT_BASE_URL.to_string(),
            checkout_urls: CheckoutUrls::from_base_url(DEFAULT_BASE_URL),
            preview: PreviewConfig::default(),
            stripe: StripeConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("LM_HOST").ok().unwrap_or_else(|| DEFAULT_LM_HOST.into());
        let port = env::var("LM_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for LM_PORT. {e} Using the default, {DEFAULT_LM_PORT}, instead.");
                    DEFAULT_LM_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_LM_PORT);
        let base_url = env::var("LM_BASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ LM_BASE_URL is not set. Using {DEFAULT_BASE_URL} for redirect URLs.");
            DEFAULT_BASE_URL.to_string()
        });
        let checkout_urls = configure_checkout_urls(&base_url);
        let preview = PreviewConfig::from_env_or_default();
        let stripe = StripeConfig::new_from_env_or_default();
        let mail = MailConfig::new_from_env_or_default();
        Self { host, port, base_url, checkout_urls, preview, stripe, mail }
    }
}

impl PreviewConfig {
    pub fn from_env_or_default() -> Self {
        let secret = env::var("LM_PREVIEW_TOKEN_SECRET").ok().unwrap_or_else(|| {
            warn!(
                "🚨️🚨️🚨️ LM_PREVIEW_TOKEN_SECRET is not set. Using a well-known default. Anyone can forge preview \
                 tokens for unpublished items. DO NOT run production like this. 🚨️🚨️🚨️"
            );
            "change_me".to_string()
        });
        let max_age_seconds = env::var("LM_PREVIEW_TOKEN_MAX_AGE")
            .map_err(|_| {
                info!(
                    "🪛️ LM_PREVIEW_TOKEN_MAX_AGE is not set. Using the default value of \
                     {DEFAULT_PREVIEW_MAX_AGE_SECONDS}s."
                )
            })
            .and_then(|s| {
                s.parse::<i64>().map_err(|e| warn!("🪛️ Invalid configuration value for LM_PREVIEW_TOKEN_MAX_AGE. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_PREVIEW_MAX_AGE_SECONDS);
        Self { secret: Secret::new(secret), max_age_seconds }
    }
}

fn configure_checkout_urls(base_url: &str) -> CheckoutUrls {
    let defaults = CheckoutUrls::from_base_url(base_url);
    let success_template = env::var("LM_SUCCESS_URL_TEMPLATE").ok().unwrap_or_else(|| {
        info!("🪛️ LM_SUCCESS_URL_TEMPLATE is not set. Using {}", defaults.success_template);
        defaults.success_template.clone()
    });
    let cancel_template = env::var("LM_CANCEL_URL_TEMPLATE").ok().unwrap_or_else(|| {
        info!("🪛️ LM_CANCEL_URL_TEMPLATE is not set. Using {}", defaults.cancel_template);
        defaults.cancel_template.clone()
    });
    CheckoutUrls { success_template, cancel_template }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that route handlers need at request time. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub preview_token_max_age: i64,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { preview_token_max_age: config.preview.max_age_seconds }
    }
}
