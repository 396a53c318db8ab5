//! Fan-out delivery
//!
//! For each routed record the broadcaster looks up the dataset's subscribers
//! and pushes the payload to each connection through the transport.
//!
//! ```text
//!   RecordRouter ──► Broadcaster::broadcast(dataset_id, payload)
//!                         │
//!                         ├─► registry.by_dataset(dataset_id)
//!                         │
//!                         └─► for each connection:
//!                               transport.deliver(connection_id, payload)
//!                                 ok    ──► delivered
//!                                 gone  ──► logged (optionally pruned)
//!                                 error ──► logged
//! ```
//!
//! Payloads are `bytes::Bytes`, so every delivery shares one allocation.
//! There are no retries: each subscription that existed at lookup time gets
//! exactly one delivery attempt.

pub mod broadcaster;
pub mod config;
pub mod transport;

pub use broadcaster::Broadcaster;
pub use config::BroadcastConfig;
pub use transport::{ChannelTransport, DeliveryError, DeliveryTransport};
