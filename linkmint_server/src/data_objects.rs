use std::fmt::Display;

use lm_common::Secret;
use serde::{Deserialize, Serialize};
use stripe_tools::{Price, Product};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Form body of the checkout endpoint. Everything else the session needs is resolved server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub slug: String,
    pub email: Option<String>,
}

/// The webhook shared secret, wrapped so it can sit in app data without ending up in logs.
#[derive(Clone, Default)]
pub struct WebhookSecret(pub Secret<String>);

/// Everything the (external) renderer needs to draw a product page, including the link-preview metadata with its
/// fallback chain: explicit og_* metadata first, then the product description/name, then the first image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub theme: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub images: Vec<String>,
    pub price: PricePoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub id: String,
    pub currency: String,
    pub unit_amount: Option<i64>,
}

impl ProductPage {
    pub fn new(product: &Product, price: &Price) -> Self {
        let md = &product.metadata;
        let description =
            md.get("og_description").cloned().or_else(|| product.description.clone()).unwrap_or_default();
        let og_image =
            md.get("og_image").cloned().or_else(|| product.images.first().cloned()).unwrap_or_default();
        Self {
            slug: product.slug().unwrap_or_default().to_string(),
            title: product.name.clone(),
            og_title: md.get("og_title").cloned().unwrap_or_else(|| product.name.clone()),
            og_description: description.clone(),
            description,
            theme: product.theme().to_string(),
            og_image,
            images: product.images.clone(),
            price: PricePoint { id: price.id.clone(), currency: price.currency.clone(), unit_amount: price.unit_amount },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn product(json: &str) -> Product {
        serde_json::from_str(json).unwrap()
    }

    fn price() -> Price {
        serde_json::from_str(
            r#"{"id":"price_1","product":"prod_1","active":true,"currency":"usd","unit_amount":1500}"#,
        )
        .unwrap()
    }

    #[test]
    fn og_fields_fall_back_to_product_fields() {
        let p = product(
            r#"{"id":"prod_1","name":"Widget","description":"A fine widget","active":true,
                "images":["https://img.test/1.png"],
                "metadata":{"slug":"widget-1","theme":"dark"}}"#,
        );
        let page = ProductPage::new(&p, &price());
        assert_eq!(page.og_title, "Widget");
        assert_eq!(page.og_description, "A fine widget");
        assert_eq!(page.og_image, "https://img.test/1.png");
        assert_eq!(page.theme, "dark");
        assert_eq!(page.price.unit_amount, Some(1500));
    }

    #[test]
    fn explicit_og_metadata_wins() {
        let p = product(
            r#"{"id":"prod_1","name":"Widget","description":"A fine widget","active":true,
                "metadata":{"slug":"widget-1","og_title":"Buy the Widget","og_description":"Shiny",
                            "og_image":"https://img.test/og.png"}}"#,
        );
        let page = ProductPage::new(&p, &price());
        assert_eq!(page.og_title, "Buy the Widget");
        assert_eq!(page.og_description, "Shiny");
        assert_eq!(page.description, "Shiny");
        assert_eq!(page.og_image, "https://img.test/og.png");
        assert_eq!(page.theme, "default");
    }
}
