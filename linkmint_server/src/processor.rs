//! # Webhook event processor
//!
//! A stateless reducer over a single verified Stripe event. Classification dispatches on the event type; the
//! business-relevant fields are pulled out of the variant payload and, when a recipient is known, exactly one
//! transactional email goes out through the mail dispatcher.
//!
//! Stripe retries webhook deliveries on non-2xx responses. Failing the request over a downstream notification
//! error would cause needless retries and duplicate emails, so a failed send is logged and swallowed here; only
//! a signature failure (checked before this module runs) may reject the request. The swallow is an explicit match
//! arm, not a catch-all: `send` returns a `Result` precisely so this policy stays visible.
//!
//! No event-id deduplication is performed: a redelivery of an already-processed event sends a duplicate email.

use log::*;
use mail_tools::MailSender;
use stripe_tools::{Charge, CheckoutSession, StripeEvent};

/// What the processor did with an event. Every disposition is acknowledged upstream with a 2xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// A notification was dispatched successfully.
    NotificationSent,
    /// A notification was attempted, but the mail backend failed. Deliberately still an acknowledgment.
    NotificationFailed,
    /// The event was understood but carried no usable recipient or slug.
    NothingToSend,
    /// An event type this server does not react to.
    Ignored,
}

pub async fn process_event<M: MailSender>(event: &StripeEvent, mailer: &M) -> EventDisposition {
    match event.event_type.as_str() {
        "checkout.session.completed" => on_checkout_completed(event, mailer).await,
        "charge.refunded" => on_charge_refunded(event, mailer).await,
        other => {
            debug!("💳️ Ignoring webhook event {} of type '{other}'", event.id);
            EventDisposition::Ignored
        },
    }
}

async fn on_checkout_completed<M: MailSender>(event: &StripeEvent, mailer: &M) -> EventDisposition {
    let session: CheckoutSession = match serde_json::from_value(event.data.object.clone()) {
        Ok(s) => s,
        Err(e) => {
            warn!("💳️ Event {} claimed to be a checkout session, but did not parse as one. {e}", event.id);
            return EventDisposition::NothingToSend;
        },
    };
    let email = session.customer_details.as_ref().and_then(|d| d.email.as_deref());
    let slug = session.metadata.get("product_slug").map(String::as_str).filter(|s| !s.is_empty());
    let (Some(email), Some(slug)) = (email, slug) else {
        info!("💳️ Checkout session {} completed without a buyer email or product slug. No mail to send.", session.id);
        return EventDisposition::NothingToSend;
    };
    let subject = "Your order is confirmed";
    let html = format!("<p>Thanks for your purchase of <strong>{slug}</strong>.</p>");
    let text = format!("Order confirmed for {slug}");
    match mailer.send(email, subject, &html, Some(&text)).await {
        Ok(()) => {
            info!("✉️ Order confirmation for '{slug}' sent to buyer.");
            EventDisposition::NotificationSent
        },
        Err(e) => {
            // Swallowed: the payment acknowledgment must not depend on a third-party mail outage
            warn!("✉️ Could not send order confirmation for '{slug}'. {e}");
            EventDisposition::NotificationFailed
        },
    }
}

async fn on_charge_refunded<M: MailSender>(event: &StripeEvent, mailer: &M) -> EventDisposition {
    let charge: Charge = match serde_json::from_value(event.data.object.clone()) {
        Ok(c) => c,
        Err(e) => {
            warn!("💳️ Event {} claimed to be a charge, but did not parse as one. {e}", event.id);
            return EventDisposition::NothingToSend;
        },
    };
    let Some(email) = charge.billing_details.email.as_deref() else {
        info!("💳️ Charge {} was refunded, but carries no billing email. No mail to send.", charge.id);
        return EventDisposition::NothingToSend;
    };
    let subject = "Your refund is completed";
    let html = "<p>Your refund has been processed.</p>";
    match mailer.send(email, subject, html, None).await {
        Ok(()) => {
            info!("✉️ Refund notice for charge {} sent.", charge.id);
            EventDisposition::NotificationSent
        },
        Err(e) => {
            warn!("✉️ Could not send refund notice for charge {}. {e}", charge.id);
            EventDisposition::NotificationFailed
        },
    }
}

#[cfg(test)]
mod test {
    use mail_tools::MailError;
    use mockall::mock;

    use super::*;

    mock! {
        pub MailBackend {}
        impl MailSender for MailBackend {
            async fn send<'a>(&self, to: &str, subject: &str, html: &str, text: Option<&'a str>) -> Result<(), MailError>;
        }
    }

    fn event(json: &str) -> StripeEvent {
        serde_json::from_str(json).unwrap()
    }

    fn completed_event() -> StripeEvent {
        event(
            r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{
                "id":"cs_1","url":null,
                "customer_details":{"email":"buyer@example.com"},
                "metadata":{"product_slug":"widget-1","order_public_id":"abc123"}}}}"#,
        )
    }

    #[tokio::test]
    async fn completed_checkout_sends_exactly_one_confirmation() {
        let mut mailer = MockMailBackend::new();
        mailer
            .expect_send()
            .withf(|to, subject, html, _| {
                to == "buyer@example.com" && subject == "Your order is confirmed" && html.contains("widget-1")
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        let disposition = process_event(&completed_event(), &mailer).await;
        assert_eq!(disposition, EventDisposition::NotificationSent);
    }

    #[tokio::test]
    async fn mail_failure_is_swallowed() {
        let mut mailer = MockMailBackend::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_, _, _, _| Err(MailError::Rejected { status: 500, message: "boom".to_string() }));
        let disposition = process_event(&completed_event(), &mailer).await;
        // Still an acknowledgment, just flagged as a failed notification
        assert_eq!(disposition, EventDisposition::NotificationFailed);
    }

    #[tokio::test]
    async fn completed_checkout_without_email_sends_nothing() {
        let mut mailer = MockMailBackend::new();
        mailer.expect_send().times(0);
        let ev = event(
            r#"{"id":"evt_2","type":"checkout.session.completed","data":{"object":{
                "id":"cs_2","url":null,"metadata":{"product_slug":"widget-1"}}}}"#,
        );
        assert_eq!(process_event(&ev, &mailer).await, EventDisposition::NothingToSend);
    }

    #[tokio::test]
    async fn completed_checkout_without_slug_sends_nothing() {
        let mut mailer = MockMailBackend::new();
        mailer.expect_send().times(0);
        let ev = event(
            r#"{"id":"evt_3","type":"checkout.session.completed","data":{"object":{
                "id":"cs_3","url":null,"customer_details":{"email":"buyer@example.com"},"metadata":{}}}}"#,
        );
        assert_eq!(process_event(&ev, &mailer).await, EventDisposition::NothingToSend);
    }

    #[tokio::test]
    async fn refund_with_billing_email_sends_refund_notice() {
        let mut mailer = MockMailBackend::new();
        mailer
            .expect_send()
            .withf(|to, subject, _, _| to == "buyer@example.com" && subject == "Your refund is completed")
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        let ev = event(
            r#"{"id":"evt_4","type":"charge.refunded","data":{"object":{
                "id":"ch_1","billing_details":{"email":"buyer@example.com"}}}}"#,
        );
        assert_eq!(process_event(&ev, &mailer).await, EventDisposition::NotificationSent);
    }

    #[tokio::test]
    async fn refund_without_billing_email_sends_nothing() {
        let mut mailer = MockMailBackend::new();
        mailer.expect_send().times(0);
        let ev = event(r#"{"id":"evt_5","type":"charge.refunded","data":{"object":{"id":"ch_2"}}}"#);
        assert_eq!(process_event(&ev, &mailer).await, EventDisposition::NothingToSend);
    }

    #[tokio::test]
    async fn unknown_event_types_are_ignored() {
        let mut mailer = MockMailBackend::new();
        mailer.expect_send().times(0);
        let ev = event(r#"{"id":"evt_6","type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#);
        assert_eq!(process_event(&ev, &mailer).await, EventDisposition::Ignored);
    }
}
