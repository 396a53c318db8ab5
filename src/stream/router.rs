//! Stream record router
//!
//! Resolves each record in a batch to its dataset and hands the decoded
//! payload to the broadcaster. Records are independent: a malformed record
//! or a failed lookup is logged and the rest of the batch carries on.

use std::sync::Arc;

use super::record::StreamRecord;
use super::source::resolve_dataset_id;
use crate::broadcast::{Broadcaster, DeliveryTransport};
use crate::error::{Error, Result};
use crate::registry::SubscriptionRegistry;
use crate::stats::{BatchStats, BroadcastStats};

/// Routes stream batches to the broadcaster
pub struct RecordRouter<R, T> {
    broadcaster: Arc<Broadcaster<R, T>>,
}

impl<R: SubscriptionRegistry, T: DeliveryTransport> RecordRouter<R, T> {
    pub fn new(broadcaster: Arc<Broadcaster<R, T>>) -> Self {
        Self { broadcaster }
    }

    /// Get the broadcaster
    pub fn broadcaster(&self) -> &Arc<Broadcaster<R, T>> {
        &self.broadcaster
    }

    /// Route every record in arrival order
    pub async fn route(&self, batch: &[StreamRecord]) -> BatchStats {
        let mut stats = BatchStats::new();
        stats.records = batch.len() as u64;

        for (index, record) in batch.iter().enumerate() {
            match self.route_record(record).await {
                Ok(delivery) => {
                    stats.routed += 1;
                    stats.deliveries += delivery;
                }
                Err(e @ Error::MalformedRecord(_)) => {
                    stats.malformed += 1;
                    tracing::warn!(
                        index = index,
                        source_id = %record.source_id,
                        error = %e,
                        "Skipping malformed record"
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::error!(
                        index = index,
                        source_id = %record.source_id,
                        error = %e,
                        "Failed to route record"
                    );
                }
            }
        }

        tracing::info!(
            records = stats.records,
            routed = stats.routed,
            malformed = stats.malformed,
            failed = stats.failed,
            delivered = stats.deliveries.delivered,
            "Batch routed"
        );

        stats
    }

    /// Resolve, decode and broadcast a single record
    pub async fn route_record(&self, record: &StreamRecord) -> Result<BroadcastStats> {
        let dataset_id = resolve_dataset_id(&record.source_id)
            .map_err(|e| Error::MalformedRecord(format!("source id: {}", e)))?;
        let payload = record
            .decode_payload()
            .map_err(|e| Error::MalformedRecord(format!("payload: {}", e)))?;

        Ok(self.broadcaster.broadcast(&dataset_id, payload).await?)
    }
}
