use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use mail_tools::Mailer;
use stripe_tools::StripeApi;

use crate::{
    config::{ServerConfig, ServerOptions},
    data_objects::WebhookSecret,
    errors::ServerError,
    preview::PreviewTokenSigner,
    routes::{create_checkout_session, health, preview_token, product_page, stripe_webhook},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let srv = create_server_instance(config)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig) -> Result<Server, ServerError> {
    let api = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mailer = Mailer::from_config(&config.mail).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("✉️ Transactional mail goes through the '{}' backend", mailer.provider_name());
    let signer = PreviewTokenSigner::new(config.preview.secret.clone());
    let options = ServerOptions::from_config(&config);
    let webhook_secret = WebhookSecret(config.stripe.webhook_secret.clone());
    let checkout_urls = config.checkout_urls.clone();
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("linkmint::access_log"))
            .app_data(web::Data::new(api.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .app_data(web::Data::new(signer.clone()))
            .app_data(web::Data::new(options))
            .app_data(web::Data::new(webhook_secret.clone()))
            .app_data(web::Data::new(checkout_urls.clone()))
            .service(health)
            .service(product_page)
            .service(preview_token)
            .service(create_checkout_session)
            .service(web::resource("/api/stripe/webhook").route(web::post().to(stripe_webhook::<Mailer>)))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
