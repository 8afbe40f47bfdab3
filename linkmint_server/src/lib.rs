//! # LinkMint server
//! This module hosts the server code for LinkMint. It is responsible for:
//! Serving public product-page data for sellable items addressed by slug.
//! Issuing and verifying preview tokens for unpublished items.
//! Building hosted checkout sessions and redirecting buyers to Stripe.
//! Listening for signed webhook events from Stripe and dispatching transactional email.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/p/{slug}`: Resolved product + price data for a slug, with preview-token access control.
//! * `/preview-token/{slug}`: Issues a signed preview token for an unpublished item.
//! * `/api/checkout/session`: Builds a checkout session and redirects to the Stripe-hosted page.
//! * `/api/stripe/webhook`: The webhook route for receiving signed payment events from Stripe.

pub mod cli;
pub mod config;
pub mod errors;

pub mod data_objects;
pub mod helpers;
pub mod preview;
pub mod processor;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
