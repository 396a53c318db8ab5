//! Fan-out broadcaster
//!
//! Delivers one payload to every subscriber of a dataset. Each delivery is
//! attempted independently: a failure is logged and counted, and the
//! remaining connections are still tried.

use std::sync::Arc;

use bytes::Bytes;

use super::config::BroadcastConfig;
use super::transport::{DeliveryError, DeliveryTransport};
use crate::registry::{RegistryError, SubscriptionRegistry};
use crate::stats::BroadcastStats;

/// Fans payloads out to the connections subscribed to a dataset
pub struct Broadcaster<R, T> {
    registry: Arc<R>,
    transport: Arc<T>,
    config: BroadcastConfig,
}

impl<R: SubscriptionRegistry, T: DeliveryTransport> Broadcaster<R, T> {
    /// Create a broadcaster with default configuration
    pub fn new(registry: Arc<R>, transport: Arc<T>) -> Self {
        Self::with_config(registry, transport, BroadcastConfig::default())
    }

    /// Create a broadcaster with custom configuration
    pub fn with_config(registry: Arc<R>, transport: Arc<T>, config: BroadcastConfig) -> Self {
        Self {
            registry,
            transport,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Deliver `payload` to every subscriber of `dataset_id`
    ///
    /// Only the subscriber lookup can fail; per-connection delivery failures
    /// are reflected in the returned stats.
    pub async fn broadcast(
        &self,
        dataset_id: &str,
        payload: Bytes,
    ) -> Result<BroadcastStats, RegistryError> {
        let subscribers = self.registry.by_dataset(dataset_id).await?;

        let mut stats = BroadcastStats::new();
        stats.recipients = subscribers.len() as u64;

        for sub in &subscribers {
            let connection_id = sub.connection_id.as_str();

            match self.transport.deliver(connection_id, payload.clone()).await {
                Ok(()) => {
                    stats.delivered += 1;
                    tracing::debug!(
                        dataset_id = %dataset_id,
                        connection_id = %connection_id,
                        bytes = payload.len(),
                        "Delivered record"
                    );
                }
                Err(DeliveryError::Gone) => {
                    stats.gone += 1;
                    tracing::warn!(
                        dataset_id = %dataset_id,
                        connection_id = %connection_id,
                        "Connection gone, delivery skipped"
                    );

                    if self.config.prune_gone_connections && self.prune(connection_id).await {
                        stats.pruned += 1;
                    }
                }
                Err(DeliveryError::Failed(reason)) => {
                    stats.failed += 1;
                    tracing::warn!(
                        dataset_id = %dataset_id,
                        connection_id = %connection_id,
                        error = %reason,
                        "Delivery failed"
                    );
                }
            }
        }

        tracing::debug!(
            dataset_id = %dataset_id,
            recipients = stats.recipients,
            delivered = stats.delivered,
            gone = stats.gone,
            failed = stats.failed,
            "Broadcast complete"
        );

        Ok(stats)
    }

    async fn prune(&self, connection_id: &str) -> bool {
        match self.registry.delete(connection_id).await {
            Ok(removed) => {
                if removed.is_some() {
                    tracing::info!(
                        connection_id = %connection_id,
                        "Removed subscription for gone connection"
                    );
                }
                removed.is_some()
            }
            Err(e) => {
                tracing::error!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to remove subscription for gone connection"
                );
                false
            }
        }
    }
}
