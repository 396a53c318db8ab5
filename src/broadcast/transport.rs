//! Push delivery transport
//!
//! [`DeliveryTransport`] is the seam for the external push mechanism
//! (for example a WebSocket gateway management API). [`ChannelTransport`]
//! delivers in process over one bounded channel per connection.

use std::collections::HashMap;
use std::future::Future;

use bytes::Bytes;
use tokio::sync::{mpsc, RwLock};

/// Why a single delivery did not happen
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The connection no longer exists
    #[error("connection gone")]
    Gone,
    /// The transport rejected or failed the push
    #[error("{0}")]
    Failed(String),
}

/// Pushes a payload to one connection
pub trait DeliveryTransport: Send + Sync {
    fn deliver(
        &self,
        connection_id: &str,
        payload: Bytes,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// In-process transport backed by `tokio::sync::mpsc`
///
/// Each attached connection owns the receiving half. A connection that was
/// never attached, was detached, or dropped its receiver reports
/// [`DeliveryError::Gone`]. A full channel reports [`DeliveryError::Failed`]
/// rather than waiting.
pub struct ChannelTransport {
    connections: RwLock<HashMap<String, mpsc::Sender<Bytes>>>,
    capacity: usize,
}

impl ChannelTransport {
    /// Default per-connection buffer
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a transport with a custom per-connection buffer
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Attach a connection and return its receiving half
    ///
    /// Re-attaching an id replaces the previous channel.
    pub async fn attach(&self, connection_id: impl Into<String>) -> mpsc::Receiver<Bytes> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.connections
            .write()
            .await
            .insert(connection_id.into(), tx);
        rx
    }

    /// Detach a connection; later deliveries report `Gone`
    pub async fn detach(&self, connection_id: &str) -> bool {
        self.connections
            .write()
            .await
            .remove(connection_id)
            .is_some()
    }

    /// Number of attached connections
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ChannelTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryTransport for ChannelTransport {
    async fn deliver(&self, connection_id: &str, payload: Bytes) -> Result<(), DeliveryError> {
        let connections = self.connections.read().await;
        let tx = connections.get(connection_id).ok_or(DeliveryError::Gone)?;

        tx.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Gone,
            mpsc::error::TrySendError::Full(_) => {
                DeliveryError::Failed(format!("send buffer full ({} messages)", self.capacity))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deliver_to_attached() {
        let transport = ChannelTransport::new();
        let mut rx = transport.attach("conn-1").await;

        transport
            .deliver("conn-1", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_unknown_connection_is_gone() {
        let transport = ChannelTransport::new();
        let result = transport.deliver("nobody", Bytes::new()).await;
        assert_eq!(result, Err(DeliveryError::Gone));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_gone() {
        let transport = ChannelTransport::new();
        drop(transport.attach("conn-1").await);

        let result = transport.deliver("conn-1", Bytes::new()).await;
        assert_eq!(result, Err(DeliveryError::Gone));
    }

    #[tokio::test]
    async fn test_detach() {
        let transport = ChannelTransport::new();
        let _rx = transport.attach("conn-1").await;

        assert!(transport.detach("conn-1").await);
        assert!(!transport.detach("conn-1").await);
        assert_eq!(transport.connection_count().await, 0);
        assert_eq!(
            transport.deliver("conn-1", Bytes::new()).await,
            Err(DeliveryError::Gone)
        );
    }

    #[tokio::test]
    async fn test_full_buffer_fails() {
        let transport = ChannelTransport::with_capacity(1);
        let _rx = transport.attach("conn-1").await;

        transport.deliver("conn-1", Bytes::new()).await.unwrap();
        let result = transport.deliver("conn-1", Bytes::new()).await;
        assert!(matches!(result, Err(DeliveryError::Failed(_))));
    }
}
