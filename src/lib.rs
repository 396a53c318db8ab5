//! # event-data-subscription
//!
//! Real-time notification bridge between an append-only event stream and
//! WebSocket listeners.
//!
//! Clients connect with a dataset id and a credential. Once authorized, the
//! connection is registered as a subscriber of that dataset. Every record
//! arriving on the dataset's stream is then pushed to all of its subscribers.
//!
//! ```text
//!   gateway CONNECT/DISCONNECT ──► ConnectionManager ──► AuthorizationGate
//!                                        │
//!                                        ▼
//!                               SubscriptionRegistry
//!                                        ▲
//!                                        │ by_dataset
//!   stream batch ──► RecordRouter ──► Broadcaster ──► DeliveryTransport
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use event_data_subscription::auth::{AccessDecision, AuthServiceError, ResourceAuthorizer, WebhookAuthorizer};
//! use event_data_subscription::broadcast::ChannelTransport;
//! use event_data_subscription::registry::MemoryRegistry;
//! use event_data_subscription::{ServiceConfig, SubscriptionService};
//!
//! struct Resources;
//!
//! impl ResourceAuthorizer for Resources {
//!     async fn has_access(&self, token: &str, _scope: &str, _resource: &str) -> Result<bool, AuthServiceError> {
//!         Ok(token == "let-me-in")
//!     }
//! }
//!
//! struct Webhooks;
//!
//! impl WebhookAuthorizer for Webhooks {
//!     async fn authorize_webhook_token(&self, _dataset_id: &str, _token: &str, _operation: &str) -> Result<AccessDecision, AuthServiceError> {
//!         Ok(AccessDecision::denied("Webhook tokens disabled"))
//!     }
//! }
//!
//! # async fn run(gateway_request: &str, kinesis_batch: &str) -> event_data_subscription::Result<()> {
//! let service = SubscriptionService::with_authorizers(
//!     ServiceConfig::default(),
//!     Arc::new(MemoryRegistry::new()),
//!     Arc::new(Resources),
//!     Arc::new(Webhooks),
//!     Arc::new(ChannelTransport::new()),
//! );
//!
//! let outcome = service.handle_gateway_request(gateway_request).await;
//! println!("{} {}", outcome.status_code, outcome.body);
//!
//! let stats = service.handle_stream_json(kinesis_batch).await?;
//! println!("delivered {} records", stats.deliveries.delivered);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod broadcast;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod service;
pub mod stats;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use lifecycle::{LifecycleEvent, Outcome};
pub use service::{ServiceConfig, SubscriptionService};
