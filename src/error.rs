//! Error types for event-data-subscription
//!
//! Connect-path errors are turned into an [`Outcome`](crate::lifecycle::Outcome)
//! by the lifecycle manager. Stream-path errors are logged per record or per
//! connection and never reach the caller.

use std::time::Duration;

use crate::auth::AuthServiceError;
use crate::broadcast::DeliveryError;
use crate::registry::RegistryError;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connect event without a dataset id or without any credential
    #[error("bad request")]
    BadRequest,

    /// Authorizer rejected the credential itself
    #[error("unauthorized")]
    Unauthorized,

    /// Credential is valid but grants no access to the dataset
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// Authorizer unavailable or failed
    #[error("authorization service error: {0}")]
    AuthService(AuthServiceError),

    /// Source identifier or payload could not be parsed
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Push to a single connection failed
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// Lifecycle event label is neither CONNECT nor DISCONNECT
    #[error("unrecognized event type: {0}")]
    UnrecognizedEvent(String),

    /// Subscription store failure
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Inbound event could not be decoded
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    /// Invocation ran past its deadline
    #[error("invocation exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl Error {
    /// HTTP-style status code reported back to the gateway
    pub fn status_code(&self) -> u16 {
        match self {
            Error::BadRequest | Error::InvalidEvent(_) => 400,
            Error::Unauthorized => 401,
            Error::Forbidden { .. } => 403,
            Error::AuthService(_)
            | Error::MalformedRecord(_)
            | Error::Delivery(_)
            | Error::UnrecognizedEvent(_)
            | Error::Registry(_)
            | Error::DeadlineExceeded(_) => 500,
        }
    }
}

impl From<AuthServiceError> for Error {
    /// A 401 from the authorizer is an authentication failure, anything
    /// else is an internal error.
    fn from(err: AuthServiceError) -> Self {
        if err.is_unauthenticated() {
            Error::Unauthorized
        } else {
            Error::AuthService(err)
        }
    }
}
