//! Subscription registry
//!
//! Maps each connection to the single dataset it subscribed to, with a
//! secondary index for the reverse lookup used by the broadcaster.
//!
//! ```text
//!                 SubscriptionRegistry
//!          ┌──────────────────────────────────┐
//!          │ connection_id ──► Subscription   │  ◄── put / delete (lifecycle)
//!          │                                  │
//!          │ dataset_id ──► {connection_id}   │  ◄── by_dataset (broadcaster)
//!          └──────────────────────────────────┘
//! ```
//!
//! Only the lifecycle manager creates or deletes subscriptions. There is no
//! expiry: a connection that drops without a disconnect event stays
//! registered until removed.

pub mod error;
pub mod store;
pub mod subscription;

pub use error::RegistryError;
pub use store::{MemoryRegistry, SubscriptionRegistry};
pub use subscription::Subscription;
