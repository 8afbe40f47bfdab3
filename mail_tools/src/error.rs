use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Could not initialize mail client: {0}")]
    Initialization(String),
    #[error("Could not reach the mail backend: {0}")]
    RequestError(String),
    #[error("The mail backend rejected the message. Error {status}. {message}")]
    Rejected { status: u16, message: String },
}
