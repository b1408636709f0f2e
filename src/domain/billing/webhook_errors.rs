//! Webhook processing errors.

use crate::domain::foundation::DomainError;
use thiserror::Error;

/// Errors from webhook verification and processing.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WebhookError {
    /// The signature header was absent.
    #[error("missing signature header")]
    MissingSignature,

    /// The signature did not match the payload.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// The body could not be parsed as an event envelope.
    #[error("failed to parse webhook payload: {0}")]
    ParseError(String),

    /// A field the handler requires was absent from the payload.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The event asked for a status change the state machine forbids.
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    /// The event was acknowledged without processing (unknown type or
    /// no matching local row).
    #[error("event ignored: {0}")]
    Ignored(String),

    /// Persistence failure while processing.
    #[error("database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// HTTP status the receiver should answer with.
    ///
    /// Signature and parse failures are the caller's fault (400).
    /// Ignored events are acknowledged (200) so the gateway stops
    /// redelivering them. Database failures are answered 500 so the
    /// gateway retries.
    pub fn status_code(&self) -> u16 {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::ParseError(_)
            | WebhookError::MissingField(_) => 400,
            WebhookError::Ignored(_) => 200,
            WebhookError::InvalidTransition(_) | WebhookError::Database(_) => 500,
        }
    }

    /// Returns true if the gateway retrying the delivery could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.message)
    }
}
