//! Subscription registry implementation
//!
//! The registry is keyed by connection id with a secondary index on dataset
//! id. [`SubscriptionRegistry`] is the seam for the external key-value store;
//! [`MemoryRegistry`] keeps everything in process.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use tokio::sync::RwLock;

use super::error::RegistryError;
use super::subscription::Subscription;

/// Keyed store of subscriptions with a lookup by dataset
///
/// Writes are keyed by a caller-unique connection id, so implementations need
/// no cross-key locking. Index reads may be eventually consistent.
pub trait SubscriptionRegistry: Send + Sync {
    /// Insert or replace the subscription for `subscription.connection_id`
    fn put(
        &self,
        subscription: Subscription,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send;

    /// Remove the subscription for a connection
    ///
    /// Returns the removed record, or `None` if there was nothing to remove.
    /// Removing a missing key is not an error.
    fn delete(
        &self,
        connection_id: &str,
    ) -> impl Future<Output = Result<Option<Subscription>, RegistryError>> + Send;

    /// Look up a single subscription by connection id
    fn get(
        &self,
        connection_id: &str,
    ) -> impl Future<Output = Result<Option<Subscription>, RegistryError>> + Send;

    /// All subscriptions for a dataset, in no particular order
    fn by_dataset(
        &self,
        dataset_id: &str,
    ) -> impl Future<Output = Result<Vec<Subscription>, RegistryError>> + Send;
}

#[derive(Default)]
struct Tables {
    /// Primary table keyed by connection id
    subscriptions: HashMap<String, Subscription>,

    /// Secondary index: dataset id -> connection ids
    by_dataset: HashMap<String, HashSet<String>>,
}

impl Tables {
    fn unindex(&mut self, subscription: &Subscription) {
        if let Some(ids) = self.by_dataset.get_mut(&subscription.dataset_id) {
            ids.remove(&subscription.connection_id);
            if ids.is_empty() {
                self.by_dataset.remove(&subscription.dataset_id);
            }
        }
    }
}

/// In-process subscription registry
///
/// The primary table and the dataset index live under one `RwLock`, so a
/// reader never observes an index entry without its record.
pub struct MemoryRegistry {
    tables: RwLock<Tables>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create a registry pre-populated with subscriptions
    pub fn with_subscriptions(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let mut tables = Tables::default();
        for sub in subscriptions {
            if let Some(previous) = tables.subscriptions.remove(&sub.connection_id) {
                tables.unindex(&previous);
            }
            tables
                .by_dataset
                .entry(sub.dataset_id.clone())
                .or_default()
                .insert(sub.connection_id.clone());
            tables.subscriptions.insert(sub.connection_id.clone(), sub);
        }

        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Total number of subscriptions
    pub async fn len(&self) -> usize {
        self.tables.read().await.subscriptions.len()
    }

    /// Whether the registry holds no subscriptions
    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.subscriptions.is_empty()
    }

    /// Number of distinct datasets with at least one subscriber
    pub async fn dataset_count(&self) -> usize {
        self.tables.read().await.by_dataset.len()
    }

    /// Snapshot of every subscription
    pub async fn scan(&self) -> Vec<Subscription> {
        self.tables
            .read()
            .await
            .subscriptions
            .values()
            .cloned()
            .collect()
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionRegistry for MemoryRegistry {
    async fn put(&self, subscription: Subscription) -> Result<(), RegistryError> {
        let mut tables = self.tables.write().await;

        if let Some(previous) = tables.subscriptions.remove(&subscription.connection_id) {
            tables.unindex(&previous);
            tracing::debug!(
                connection_id = %previous.connection_id,
                dataset_id = %previous.dataset_id,
                "Replacing existing subscription"
            );
        }

        tables
            .by_dataset
            .entry(subscription.dataset_id.clone())
            .or_default()
            .insert(subscription.connection_id.clone());
        tables
            .subscriptions
            .insert(subscription.connection_id.clone(), subscription);

        Ok(())
    }

    async fn delete(&self, connection_id: &str) -> Result<Option<Subscription>, RegistryError> {
        let mut tables = self.tables.write().await;

        let removed = tables.subscriptions.remove(connection_id);
        if let Some(ref sub) = removed {
            tables.unindex(sub);
        }

        Ok(removed)
    }

    async fn get(&self, connection_id: &str) -> Result<Option<Subscription>, RegistryError> {
        Ok(self
            .tables
            .read()
            .await
            .subscriptions
            .get(connection_id)
            .cloned())
    }

    async fn by_dataset(&self, dataset_id: &str) -> Result<Vec<Subscription>, RegistryError> {
        let tables = self.tables.read().await;

        let subs = tables
            .by_dataset
            .get(dataset_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.subscriptions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(subs)
    }
}
