//! Authorization configuration

use std::time::Duration;

/// Authorization gate configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Scope checked for bearer credentials
    pub bearer_scope: String,

    /// Prefix prepended to the dataset id to form the checked resource
    pub resource_prefix: String,

    /// Operation requested for webhook tokens
    pub webhook_operation: String,

    /// Retries after a transport or 5xx failure of the webhook check
    pub webhook_retries: u32,

    /// Base delay between webhook retries, multiplied by the attempt number
    pub retry_backoff: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bearer_scope: "okdata:dataset:read".to_string(),
            resource_prefix: "okdata:dataset:".to_string(),
            webhook_operation: "read".to_string(),
            webhook_retries: 3,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

impl AuthConfig {
    /// Set the bearer scope
    pub fn bearer_scope(mut self, scope: impl Into<String>) -> Self {
        self.bearer_scope = scope.into();
        self
    }

    /// Set the resource prefix
    pub fn resource_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.resource_prefix = prefix.into();
        self
    }

    /// Set the operation requested for webhook tokens
    pub fn webhook_operation(mut self, operation: impl Into<String>) -> Self {
        self.webhook_operation = operation.into();
        self
    }

    /// Set the webhook retry count
    pub fn webhook_retries(mut self, retries: u32) -> Self {
        self.webhook_retries = retries;
        self
    }

    /// Set the retry backoff
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Resource name checked for a dataset
    pub fn resource_for(&self, dataset_id: &str) -> String {
        format!("{}{}", self.resource_prefix, dataset_id)
    }
}
