//! Checkout session building blocks.
//!
//! The buyer's browser never sees Stripe's session id at redirect time, so the success URL carries a locally
//! generated `order_public_id` instead. The same id travels in the session metadata, which is how a later webhook
//! event is correlated back to the original checkout request.

/// URL templates for the post-checkout redirects. `{slug}` and `{order_public_id}` are substituted literally;
/// no other templating is supported.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_template: String,
    pub cancel_template: String,
}

impl CheckoutUrls {
    /// The default templates point back at the product page, flagged so the (external) renderer can show a
    /// confirmation or cancellation banner.
    pub fn from_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            success_template: format!("{base_url}/p/{{slug}}?success=1&op={{order_public_id}}"),
            cancel_template: format!("{base_url}/p/{{slug}}?cancel=1"),
        }
    }

    pub fn success_url(&self, slug: &str, order_public_id: &str) -> String {
        self.success_template.replace("{slug}", slug).replace("{order_public_id}", order_public_id)
    }

    pub fn cancel_url(&self, slug: &str) -> String {
        self.cancel_template.replace("{slug}", slug)
    }
}

/// Everything needed to request a hosted checkout session: one line item of quantity 1 at `price_id`, plus the
/// correlation metadata from the checkout endpoint.
#[derive(Debug, Clone)]
pub struct NewCheckoutSession {
    pub slug: String,
    pub price_id: String,
    pub customer_email: Option<String>,
    pub order_public_id: String,
}

impl NewCheckoutSession {
    /// The form-encoded body of a `POST /v1/checkout/sessions` request.
    pub fn to_form(&self, urls: &CheckoutUrls) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("line_items[0][price]".to_string(), self.price_id.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), urls.success_url(&self.slug, &self.order_public_id)),
            ("cancel_url".to_string(), urls.cancel_url(&self.slug)),
            ("metadata[product_slug]".to_string(), self.slug.clone()),
            ("metadata[order_public_id]".to_string(), self.order_public_id.clone()),
        ];
        if let Some(email) = &self.customer_email {
            form.push(("customer_email".to_string(), email.clone()));
        }
        form
    }
}
