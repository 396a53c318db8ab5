//! Broadcaster configuration

/// Broadcaster configuration
#[derive(Debug, Clone, Default)]
pub struct BroadcastConfig {
    /// Delete a subscription when delivery reports its connection gone
    ///
    /// Off by default: stale subscriptions stay until a disconnect event.
    pub prune_gone_connections: bool,
}

impl BroadcastConfig {
    /// Treat a gone connection as an implicit disconnect
    pub fn prune_gone_connections(mut self, enabled: bool) -> Self {
        self.prune_gone_connections = enabled;
        self
    }
}
