//! # Transactional mail dispatch
//!
//! A uniform `send` capability over a closed set of outbound email backends (Postmark, Brevo, Sendgrid), with a
//! no-op backend for unconfigured deployments. The active backend is selected once at startup from the
//! environment; adding a backend means adding a [`Mailer`] variant, not subclassing anything.
//!
//! Delivery is best-effort and fire-and-forget: `send` returns a `Result` rather than panicking, so callers that
//! must not fail on a notification outage (the webhook event processor, chiefly) can make the swallow-and-continue
//! policy an explicit branch.

mod config;
mod error;
mod mailer;

pub use config::MailConfig;
pub use error::MailError;
pub use mailer::{MailSender, Mailer};
