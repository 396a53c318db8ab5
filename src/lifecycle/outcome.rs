//! Lifecycle responses

use serde::Serialize;

use crate::error::Error;

/// Response to a connect or disconnect event
///
/// Serializes as `{"statusCode": ..., "body": ...}`, the shape the WebSocket
/// gateway expects from its route handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub status_code: u16,
    pub body: String,
}

impl Outcome {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Connect accepted
    pub fn connected() -> Self {
        Self::new(200, "Connected")
    }

    /// Disconnect handled
    pub fn disconnected() -> Self {
        Self::new(200, "Disconnected")
    }

    /// Whether the gateway should keep the connection
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl From<&Error> for Outcome {
    fn from(err: &Error) -> Self {
        let body = match err {
            Error::BadRequest | Error::InvalidEvent(_) => "Bad request".to_string(),
            Error::Unauthorized => "Unauthorized".to_string(),
            Error::Forbidden { reason } => reason.clone(),
            Error::UnrecognizedEvent(_) => "Unrecognized event type".to_string(),
            Error::AuthService(_)
            | Error::MalformedRecord(_)
            | Error::Delivery(_)
            | Error::Registry(_)
            | Error::DeadlineExceeded(_) => "Internal server error".to_string(),
        };

        Self::new(err.status_code(), body)
    }
}

impl From<Error> for Outcome {
    fn from(err: Error) -> Self {
        Outcome::from(&err)
    }
}
