use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A sellable item as Stripe returns it. The merchant-facing attributes (slug, theme, publication flag and
/// link-preview fields) all live in the free-form `metadata` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub default_price: Option<PriceRef>,
    #[serde(default)]
    pub active: bool,
}

impl Product {
    pub fn slug(&self) -> Option<&str> {
        self.metadata.get("slug").map(String::as_str)
    }

    /// Products with no `published` entry are treated as published. Only the literal string "true" publishes an
    /// item that carries the flag.
    pub fn is_published(&self) -> bool {
        self.metadata.get("published").map(|v| v == "true").unwrap_or(true)
    }

    pub fn theme(&self) -> &str {
        self.metadata.get("theme").map(String::as_str).unwrap_or("default")
    }

    pub fn default_price_id(&self) -> Option<&str> {
        self.default_price.as_ref().map(PriceRef::id)
    }
}

/// Stripe returns `default_price` either as a bare price id or as an expanded price object, depending on the
/// `expand` parameters of the request that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceRef {
    Id(String),
    Expanded(Box<Price>),
}

impl PriceRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id.as_str(),
            Self::Expanded(price) => price.id.as_str(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
    pub product: String,
    pub active: bool,
    pub currency: String,
    /// Amount in minor currency units. Stripe omits it for metered prices.
    pub unit_amount: Option<i64>,
}

/// One page of a Stripe list response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// The Stripe-hosted payment page. Present on freshly created sessions.
    pub url: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub billing_details: BillingDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    pub email: Option<String>,
}

/// A verified webhook event. The shape of `data.object` depends on `type`, so it stays a raw JSON value until the
/// event processor has classified the event.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_price_deserializes_as_id_or_object() {
        let bare: Product = serde_json::from_str(
            r#"{"id":"prod_1","name":"Widget","description":null,"default_price":"price_1","active":true}"#,
        )
        .unwrap();
        assert_eq!(bare.default_price_id(), Some("price_1"));

        let expanded: Product = serde_json::from_str(
            r#"{"id":"prod_1","name":"Widget","description":null,"active":true,
                "default_price":{"id":"price_9","product":"prod_1","active":false,"currency":"usd","unit_amount":500}}"#,
        )
        .unwrap();
        assert_eq!(expanded.default_price_id(), Some("price_9"));
    }

    #[test]
    fn publication_flag_defaults_to_published() {
        let mut product: Product =
            serde_json::from_str(r#"{"id":"prod_1","name":"Widget","description":null,"active":true}"#).unwrap();
        assert!(product.is_published());
        product.metadata.insert("published".into(), "false".into());
        assert!(!product.is_published());
        product.metadata.insert("published".into(), "true".into());
        assert!(product.is_published());
        // Anything other than the literal "true" is unpublished
        product.metadata.insert("published".into(), "True".into());
        assert!(!product.is_published());
    }
}
