//! Service configuration

use std::time::Duration;

use crate::auth::AuthConfig;
use crate::broadcast::BroadcastConfig;

/// Service configuration options
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Authorization gate settings
    pub auth: AuthConfig,

    /// Broadcaster settings
    pub broadcast: BroadcastConfig,

    /// Deadline for a single lifecycle event or stream batch (None = no limit)
    pub invocation_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            broadcast: BroadcastConfig::default(),
            invocation_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ServiceConfig {
    /// Set the authorization settings
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Set the broadcaster settings
    pub fn broadcast(mut self, broadcast: BroadcastConfig) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// Set the per-invocation deadline
    pub fn invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = Some(timeout);
        self
    }

    /// Run invocations without a deadline
    pub fn no_invocation_timeout(mut self) -> Self {
        self.invocation_timeout = None;
        self
    }

    /// Treat gone connections as implicit disconnects
    pub fn prune_gone_connections(mut self, enabled: bool) -> Self {
        self.broadcast.prune_gone_connections = enabled;
        self
    }
}
