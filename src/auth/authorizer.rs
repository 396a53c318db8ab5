//! Dataset authorizer
//!
//! The [`AuthorizationGate`] implementation used in production: bearer tokens
//! go through a generic resource access check, webhook tokens through the
//! dataset-scoped webhook check.

use std::sync::Arc;

use super::config::AuthConfig;
use super::credential::Credential;
use super::gate::{
    AccessDecision, AuthServiceError, AuthorizationGate, ResourceAuthorizer, WebhookAuthorizer,
};

/// Reason reported when a bearer token has no access
pub const BEARER_DENIED_REASON: &str = "Forbidden";

/// Gate dispatching on the credential variant
pub struct DatasetAuthorizer<B, W> {
    resources: Arc<B>,
    webhooks: Arc<W>,
    config: AuthConfig,
}

impl<B: ResourceAuthorizer, W: WebhookAuthorizer> DatasetAuthorizer<B, W> {
    /// Create an authorizer with default configuration
    pub fn new(resources: Arc<B>, webhooks: Arc<W>) -> Self {
        Self::with_config(resources, webhooks, AuthConfig::default())
    }

    /// Create an authorizer with custom configuration
    pub fn with_config(resources: Arc<B>, webhooks: Arc<W>, config: AuthConfig) -> Self {
        Self {
            resources,
            webhooks,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    async fn authorize_bearer(
        &self,
        dataset_id: &str,
        token: &str,
    ) -> Result<AccessDecision, AuthServiceError> {
        let resource = self.config.resource_for(dataset_id);
        let allowed = self
            .resources
            .has_access(token, &self.config.bearer_scope, &resource)
            .await?;

        if allowed {
            Ok(AccessDecision::granted())
        } else {
            Ok(AccessDecision::denied(BEARER_DENIED_REASON))
        }
    }

    async fn authorize_webhook(
        &self,
        dataset_id: &str,
        token: &str,
    ) -> Result<AccessDecision, AuthServiceError> {
        let operation = self.config.webhook_operation.as_str();
        let mut attempt = 0;

        loop {
            match self
                .webhooks
                .authorize_webhook_token(dataset_id, token, operation)
                .await
            {
                Ok(decision) => return Ok(decision),
                Err(e) if !e.is_retryable() || attempt >= self.config.webhook_retries => {
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    tracing::warn!(
                        dataset_id = %dataset_id,
                        attempt = attempt,
                        max_retries = self.config.webhook_retries,
                        error = %e,
                        "Webhook token check failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
            }
        }
    }
}

impl<B: ResourceAuthorizer, W: WebhookAuthorizer> AuthorizationGate for DatasetAuthorizer<B, W> {
    async fn authorize(
        &self,
        dataset_id: &str,
        credential: &Credential,
    ) -> Result<AccessDecision, AuthServiceError> {
        match credential {
            Credential::Bearer(token) => self.authorize_bearer(dataset_id, token).await,
            Credential::Webhook(token) => self.authorize_webhook(dataset_id, token).await,
        }
    }
}
