use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the Stripe API: {0}")]
    RequestError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The Stripe API returned an empty response")]
    EmptyResponse,
}

impl StripeApiError {
    /// True when the error was a transport-level failure (timeout, DNS, connection refused) rather than a
    /// well-formed rejection from Stripe.
    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(self, Self::RequestError(_))
    }
}
