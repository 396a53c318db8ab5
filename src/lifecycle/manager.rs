//! Connection lifecycle manager
//!
//! Per connection id the manager moves between two states:
//!
//! ```text
//!            CONNECT (authorized)
//!   ABSENT ───────────────────────► SUBSCRIBED
//!     ▲                                 │
//!     └─────────── DISCONNECT ──────────┘
//! ```
//!
//! A rejected connect leaves the registry untouched. Disconnect always
//! succeeds, whether or not a subscription existed.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::event::LifecycleEvent;
use super::outcome::Outcome;
use crate::auth::{AuthorizationGate, Credential};
use crate::error::{Error, Result};
use crate::registry::{Subscription, SubscriptionRegistry};

/// Source of the `connected_at` timestamp
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Handles connect and disconnect events
pub struct ConnectionManager<R, G> {
    registry: Arc<R>,
    gate: Arc<G>,
    clock: Clock,
}

impl<R: SubscriptionRegistry, G: AuthorizationGate> ConnectionManager<R, G> {
    /// Create a manager using the system clock
    pub fn new(registry: Arc<R>, gate: Arc<G>) -> Self {
        Self {
            registry,
            gate,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Handle a lifecycle event and produce the gateway response
    pub async fn handle(&self, event: LifecycleEvent) -> Outcome {
        let connection_id = event.connection_id().to_owned();
        let event_type = event.event_type().to_owned();

        let result = match event {
            LifecycleEvent::Connect {
                connection_id,
                dataset_id,
                credential,
            } => {
                self.connect(&connection_id, dataset_id.as_deref(), credential.as_ref())
                    .await
            }
            LifecycleEvent::Disconnect { connection_id } => self.disconnect(&connection_id).await,
            LifecycleEvent::Unrecognized { event_type, .. } => {
                Err(Error::UnrecognizedEvent(event_type))
            }
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    Error::AuthService(_) | Error::Registry(_) => tracing::error!(
                        connection_id = %connection_id,
                        event_type = %event_type,
                        error = %e,
                        "Lifecycle event failed"
                    ),
                    _ => tracing::warn!(
                        connection_id = %connection_id,
                        event_type = %event_type,
                        error = %e,
                        "Lifecycle event rejected"
                    ),
                }
                Outcome::from(&e)
            }
        }
    }

    /// Authorize and register a subscription
    pub async fn connect(
        &self,
        connection_id: &str,
        dataset_id: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<Outcome> {
        let (dataset_id, credential) = match (dataset_id, credential) {
            (Some(dataset_id), Some(credential)) if !dataset_id.is_empty() => {
                (dataset_id, credential)
            }
            _ => return Err(Error::BadRequest),
        };

        let decision = self.gate.authorize(dataset_id, credential).await?;
        if !decision.access {
            return Err(Error::Forbidden {
                reason: decision.reason.unwrap_or_else(|| "Forbidden".to_string()),
            });
        }

        let subscription = Subscription::new(connection_id, dataset_id, (self.clock)());
        self.registry.put(subscription).await?;

        tracing::info!(
            connection_id = %connection_id,
            dataset_id = %dataset_id,
            credential = credential.kind(),
            "Subscription created"
        );

        Ok(Outcome::connected())
    }

    /// Remove whatever subscription the connection holds
    pub async fn disconnect(&self, connection_id: &str) -> Result<Outcome> {
        match self.registry.delete(connection_id).await? {
            Some(sub) => tracing::info!(
                connection_id = %connection_id,
                dataset_id = %sub.dataset_id,
                "Subscription removed"
            ),
            None => tracing::debug!(
                connection_id = %connection_id,
                "Disconnect for connection without subscription"
            ),
        }

        Ok(Outcome::disconnected())
    }
}
