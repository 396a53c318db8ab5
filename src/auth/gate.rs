//! Authorization gate contract and downstream capabilities

use std::future::Future;

use serde::Deserialize;

use super::credential::Credential;

/// Access decision returned by the gate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessDecision {
    /// Whether the caller may read the dataset
    pub access: bool,
    /// Human-readable reason when access is denied
    #[serde(default)]
    pub reason: Option<String>,
}

impl AccessDecision {
    /// Access granted
    pub fn granted() -> Self {
        Self {
            access: true,
            reason: None,
        }
    }

    /// Access denied with a reason
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            access: false,
            reason: Some(reason.into()),
        }
    }
}

/// Failure talking to the authorizer
///
/// `status` is the HTTP status of the downstream response, or `None` when the
/// request never got one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (status: {status:?})")]
pub struct AuthServiceError {
    pub status: Option<u16>,
    pub message: String,
}

impl AuthServiceError {
    /// Error carrying a downstream HTTP status
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error without a response (connect failure, timeout, ...)
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// The authorizer rejected the credential itself
    pub fn is_unauthenticated(&self) -> bool {
        self.status == Some(401)
    }

    /// Transport failures and 5xx responses are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self.status {
            None => true,
            Some(status) => status >= 500,
        }
    }
}

/// Validates a credential against a dataset
pub trait AuthorizationGate: Send + Sync {
    /// Decide whether `credential` grants read access to `dataset_id`
    fn authorize(
        &self,
        dataset_id: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<AccessDecision, AuthServiceError>> + Send;
}

/// Generic access check: may `token` perform `scope` on `resource`?
pub trait ResourceAuthorizer: Send + Sync {
    fn has_access(
        &self,
        token: &str,
        scope: &str,
        resource: &str,
    ) -> impl Future<Output = Result<bool, AuthServiceError>> + Send;
}

/// Dataset-scoped one-time webhook token check
pub trait WebhookAuthorizer: Send + Sync {
    fn authorize_webhook_token(
        &self,
        dataset_id: &str,
        token: &str,
        operation: &str,
    ) -> impl Future<Output = Result<AccessDecision, AuthServiceError>> + Send;
}
