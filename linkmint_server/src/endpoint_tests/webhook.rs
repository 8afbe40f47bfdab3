use actix_web::{test, test::TestRequest, web, App};
use chrono::Utc;
use hmac::{Hmac, Mac};
use lm_common::Secret;
use mail_tools::{MailSender, Mailer};
use sha2::Sha256;

use crate::{
    data_objects::WebhookSecret,
    endpoint_tests::mocks::MockMailBackend,
    routes::stripe_webhook,
};

const SECRET: &str = "whsec_endpoint_tests";
const COMPLETED_EVENT: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{
    "id":"cs_1","url":null,
    "customer_details":{"email":"buyer@example.com"},
    "metadata":{"product_slug":"widget-1","order_public_id":"abc123"}}}}"#;

fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

async fn post_webhook_to<M: MailSender + 'static>(
    mailer: M,
    payload: &[u8],
    sig_header: Option<&str>,
) -> (u16, String) {
    let app = App::new()
        .app_data(web::Data::new(WebhookSecret(Secret::new(SECRET.to_string()))))
        .app_data(web::Data::new(mailer))
        .service(web::resource("/api/stripe/webhook").route(web::post().to(stripe_webhook::<M>)));
    let service = test::init_service(app).await;
    let mut req = TestRequest::post().uri("/api/stripe/webhook").set_payload(payload.to_vec());
    if let Some(sig) = sig_header {
        req = req.insert_header(("Stripe-Signature", sig));
    }
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status().as_u16();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    (status, body)
}

async fn post_webhook(payload: &[u8], sig_header: Option<&str>) -> (u16, String) {
    post_webhook_to(Mailer::Disabled, payload, sig_header).await
}

#[actix_web::test]
async fn verified_completed_event_is_acknowledged() {
    let header = sign(COMPLETED_EVENT, SECRET, Utc::now().timestamp());
    let (status, body) = post_webhook(COMPLETED_EVENT, Some(&header)).await;
    assert_eq!(status, 200);
    assert!(body.contains("\"success\":true"), "{body}");
}

#[actix_web::test]
async fn verified_completed_event_sends_exactly_one_mail() {
    let mut mailer = MockMailBackend::new();
    mailer
        .expect_send()
        .withf(|to, _, _, _| to == "buyer@example.com")
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    let header = sign(COMPLETED_EVENT, SECRET, Utc::now().timestamp());
    let (status, _) = post_webhook_to(mailer, COMPLETED_EVENT, Some(&header)).await;
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn tampered_payload_is_rejected_before_dispatch() {
    let mut mailer = MockMailBackend::new();
    mailer.expect_send().times(0);
    let header = sign(COMPLETED_EVENT, SECRET, Utc::now().timestamp());
    let mut tampered = COMPLETED_EVENT.to_vec();
    tampered.extend_from_slice(b" ");
    let (status, body) = post_webhook_to(mailer, &tampered, Some(&header)).await;
    assert_eq!(status, 400);
    assert!(body.contains("signature"), "{body}");
}

#[actix_web::test]
async fn wrong_secret_is_rejected_without_dispatch() {
    let mut mailer = MockMailBackend::new();
    mailer.expect_send().times(0);
    let header = sign(COMPLETED_EVENT, "whsec_other", Utc::now().timestamp());
    let (status, _) = post_webhook_to(mailer, COMPLETED_EVENT, Some(&header)).await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn missing_signature_header_is_rejected() {
    let (status, _) = post_webhook(COMPLETED_EVENT, None).await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn unhandled_event_types_are_still_acknowledged() {
    let payload: &[u8] = br#"{"id":"evt_9","type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#;
    let header = sign(payload, SECRET, Utc::now().timestamp());
    let (status, body) = post_webhook(payload, Some(&header)).await;
    assert_eq!(status, 200);
    assert!(body.contains("ignored") || body.contains("Ignored"), "{body}");
}
