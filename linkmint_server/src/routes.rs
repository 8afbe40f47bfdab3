//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! All handlers suspend only at the I/O boundary (outbound calls to Stripe or the mail backend, both carrying a
//! bounded timeout), so worker threads are never blocked on a slow upstream.

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use log::*;
use mail_tools::MailSender;
use serde::Deserialize;
use serde_json::json;
use stripe_tools::{
    verify_webhook_signature,
    CheckoutUrls,
    NewCheckoutSession,
    Price,
    Product,
    StripeApi,
    SIGNATURE_HEADER,
};

use crate::{
    config::ServerOptions,
    data_objects::{CheckoutRequest, JsonResponse, ProductPage, WebhookSecret},
    errors::ServerError,
    helpers::new_order_public_id,
    preview::PreviewTokenSigner,
    processor::{process_event, EventDisposition},
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// --------------------------------------------   Product page  ------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPageParams {
    pub preview: Option<String>,
}

/// Resolved product + price data for a slug.
///
/// Unpublished items are only visible to a request carrying a preview token that verifies for this same slug.
/// Every denial path answers 404, so an unpublished item is indistinguishable from a nonexistent one.
#[get("/p/{slug}")]
pub async fn product_page(
    path: web::Path<String>,
    params: web::Query<ProductPageParams>,
    api: web::Data<StripeApi>,
    signer: web::Data<PreviewTokenSigner>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let slug = path.into_inner();
    trace!("🛒️ GET product page for '{slug}'");
    let product = api.find_product_by_slug(&slug).await?.ok_or_else(|| not_found(&slug))?;
    if !product.is_published() {
        let authorized = params
            .preview
            .as_deref()
            .and_then(|token| signer.verify(token, options.preview_token_max_age).ok())
            .map(|token_slug| token_slug == slug)
            .unwrap_or(false);
        if !authorized {
            debug!("🛒️ '{slug}' is unpublished and the request carried no valid preview token");
            return Err(not_found(&slug));
        }
        debug!("🛒️ Valid preview token presented for unpublished item '{slug}'");
    }
    let price = api.default_price_for_product(&product).await?.ok_or_else(|| {
        debug!("🛒️ Product '{slug}' exists but has no active price");
        not_found(&slug)
    })?;
    Ok(HttpResponse::Ok().json(ProductPage::new(&product, &price)))
}

// -------------------------------------------   Preview tokens  -----------------------------------------------
#[get("/preview-token/{slug}")]
pub async fn preview_token(path: web::Path<String>, signer: web::Data<PreviewTokenSigner>) -> HttpResponse {
    let slug = path.into_inner();
    debug!("🔐️ Issuing preview token for '{slug}'");
    HttpResponse::Ok().json(json!({ "preview": signer.issue(&slug) }))
}

// ----------------------------------------------   Checkout  --------------------------------------------------
/// Builds a hosted checkout session for the item's resolved price and redirects the buyer to Stripe.
///
/// The generated `order_public_id` rides in both the success URL and the session metadata; it is the only link
/// between this request and the webhook event that eventually reports the payment.
#[post("/api/checkout/session")]
pub async fn create_checkout_session(
    form: web::Form<CheckoutRequest>,
    api: web::Data<StripeApi>,
    urls: web::Data<CheckoutUrls>,
) -> Result<HttpResponse, ServerError> {
    let CheckoutRequest { slug, email } = form.into_inner();
    let (_, price) = resolve_item(&slug, &api).await?;
    let order_public_id = new_order_public_id();
    info!("🛒️ Checkout requested for '{slug}' at price {}. Correlation id {order_public_id}", price.id);
    let session =
        NewCheckoutSession { slug, price_id: price.id, customer_email: email, order_public_id };
    let redirect_url = api.create_checkout_session(&session, &urls).await?;
    Ok(HttpResponse::SeeOther().insert_header(("Location", redirect_url)).finish())
}

// ----------------------------------------------   Webhook  ---------------------------------------------------
/// The Stripe webhook endpoint.
///
/// The signature is verified over the raw bytes before anything else happens; a mismatch rejects the request
/// with a 400. Once verified, the event processor runs and the response is a 200 acknowledgment no matter what
/// the notification path did, because Stripe retries non-2xx deliveries and a mail outage must not trigger that.
///
/// Generic over the mail backend, so it is registered by hand in `server.rs` rather than with a route attribute.
pub async fn stripe_webhook<M: MailSender + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    secret: web::Data<WebhookSecret>,
    mailer: web::Data<M>,
) -> Result<HttpResponse, ServerError> {
    trace!("💳️ Received webhook request: {}", req.uri());
    let sig_header = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let event = verify_webhook_signature(&body, sig_header, secret.0.reveal()).map_err(|e| {
        warn!("🔐️ Webhook signature verification failed. {e}");
        ServerError::WebhookRejected(e)
    })?;
    debug!("💳️ Verified webhook event {} of type '{}'", event.id, event.event_type);
    let result = match process_event(&event, mailer.get_ref()).await {
        EventDisposition::NotificationSent => JsonResponse::success("Event processed. Notification sent."),
        EventDisposition::NotificationFailed => JsonResponse::success("Event processed. Notification failed."),
        EventDisposition::NothingToSend => JsonResponse::success("Event processed. Nothing to send."),
        EventDisposition::Ignored => JsonResponse::success("Event ignored."),
    };
    Ok(HttpResponse::Ok().json(result))
}

// ----------------------------------------------   Helpers  ---------------------------------------------------
/// Resolves a slug to its product and active price. "No such slug" and "no active price" both surface as
/// `NoRecordFound`; the item simply is not sellable either way.
async fn resolve_item(slug: &str, api: &StripeApi) -> Result<(Product, Price), ServerError> {
    let product = api
        .find_product_by_slug(slug)
        .await?
        .ok_or_else(|| not_found(slug))?;
    let price = api.default_price_for_product(&product).await?.ok_or_else(|| {
        debug!("🛒️ Product '{slug}' exists but has no active price");
        not_found(slug)
    })?;
    Ok((product, price))
}

fn not_found(slug: &str) -> ServerError {
    ServerError::NoRecordFound(format!("No product found for '{slug}'"))
}
