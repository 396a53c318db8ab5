//! Authorization gate
//!
//! Decides whether a connecting caller may read a dataset. Two credential
//! kinds are accepted:
//!
//! - **Bearer**: checked with a generic `(token, scope, resource)` access
//!   check. Denials carry the fixed reason `"Forbidden"`. Never retried.
//! - **Webhook**: checked with the dataset-scoped one-time token check for
//!   operation `"read"`. Denials carry the authorizer's reason. Transient
//!   failures are retried a bounded number of times.
//!
//! A downstream 401 means the credential itself was rejected; any other
//! failure is an internal error.

pub mod authorizer;
pub mod config;
pub mod credential;
pub mod gate;

pub use authorizer::{DatasetAuthorizer, BEARER_DENIED_REASON};
pub use config::AuthConfig;
pub use credential::Credential;
pub use gate::{
    AccessDecision, AuthServiceError, AuthorizationGate, ResourceAuthorizer, WebhookAuthorizer,
};
