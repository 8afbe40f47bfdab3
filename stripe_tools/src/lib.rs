mod api;
mod checkout;
mod config;
mod error;
mod webhook;

mod data_objects;

pub use api::StripeApi;
pub use checkout::{CheckoutUrls, NewCheckoutSession};
pub use config::StripeConfig;
pub use data_objects::{
    BillingDetails,
    Charge,
    CheckoutSession,
    CustomerDetails,
    EventData,
    ListPage,
    Price,
    PriceRef,
    Product,
    StripeEvent,
};
pub use error::StripeApiError;
pub use webhook::{verify_webhook_signature, WebhookError, SIGNATURE_HEADER, SIGNATURE_TOLERANCE_SECONDS};
