//! Subscription service
//!
//! Wires the registry, authorization gate and delivery transport into the
//! two entry points the gateway and the stream consumer call.

use std::future::Future;
use std::sync::Arc;

use crate::auth::{AuthorizationGate, DatasetAuthorizer, ResourceAuthorizer, WebhookAuthorizer};
use crate::broadcast::{Broadcaster, DeliveryTransport};
use crate::error::{Error, Result};
use crate::lifecycle::{Clock, ConnectionManager, LifecycleEvent, Outcome};
use crate::registry::SubscriptionRegistry;
use crate::service::config::ServiceConfig;
use crate::stats::BatchStats;
use crate::stream::{decode_batch, RecordRouter, StreamRecord};

/// Real-time subscription service
///
/// Holds no mutable state of its own; everything shared lives in the
/// registry, so one value can serve concurrent invocations.
pub struct SubscriptionService<R, G, T> {
    config: ServiceConfig,
    registry: Arc<R>,
    connections: ConnectionManager<R, G>,
    router: RecordRouter<R, T>,
}

impl<R, G, T> SubscriptionService<R, G, T>
where
    R: SubscriptionRegistry,
    G: AuthorizationGate,
    T: DeliveryTransport,
{
    /// Create a service from its collaborators
    pub fn new(config: ServiceConfig, registry: Arc<R>, gate: Arc<G>, transport: Arc<T>) -> Self {
        let broadcaster = Arc::new(Broadcaster::with_config(
            Arc::clone(&registry),
            transport,
            config.broadcast.clone(),
        ));

        Self {
            connections: ConnectionManager::new(Arc::clone(&registry), gate),
            router: RecordRouter::new(broadcaster),
            registry,
            config,
        }
    }

    /// Replace the clock used for subscription timestamps
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.connections = self.connections.with_clock(clock);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Get the subscription registry
    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Handle a connect or disconnect event
    pub async fn handle_connection_event(&self, event: LifecycleEvent) -> Outcome {
        let connection_id = event.connection_id().to_owned();

        match self.within_deadline(self.connections.handle(event)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    connection_id = %connection_id,
                    error = %e,
                    "Lifecycle event abandoned"
                );
                Outcome::from(&e)
            }
        }
    }

    /// Handle a raw WebSocket gateway request
    pub async fn handle_gateway_request(&self, raw: &str) -> Outcome {
        match LifecycleEvent::from_gateway_json(raw) {
            Ok(event) => self.handle_connection_event(event).await,
            Err(e) => {
                let err = Error::InvalidEvent(e);
                tracing::warn!(error = %err, "Rejecting undecodable gateway request");
                Outcome::from(&err)
            }
        }
    }

    /// Route a batch of stream records to subscribers
    ///
    /// Per-record failures are logged and counted; only an overrun deadline
    /// is returned as an error.
    pub async fn handle_stream_batch(&self, batch: &[StreamRecord]) -> Result<BatchStats> {
        self.within_deadline(self.router.route(batch))
            .await
            .inspect_err(|e| {
                tracing::error!(records = batch.len(), error = %e, "Stream batch abandoned");
            })
    }

    /// Decode and route a JSON batch (Kinesis envelope or flat record list)
    ///
    /// Elements that do not decode are skipped and counted as malformed;
    /// only an unrecognized envelope fails the whole batch.
    pub async fn handle_stream_json(&self, raw: &str) -> Result<BatchStats> {
        let mut batch = Vec::new();
        let mut undecodable = 0;

        for (index, entry) in decode_batch(raw)?.into_iter().enumerate() {
            match entry {
                Ok(record) => batch.push(record),
                Err(e) => {
                    undecodable += 1;
                    tracing::warn!(index = index, error = %e, "Skipping undecodable record");
                }
            }
        }

        let mut stats = self.handle_stream_batch(&batch).await?;
        stats.records += undecodable;
        stats.malformed += undecodable;
        Ok(stats)
    }

    async fn within_deadline<F: Future>(&self, fut: F) -> Result<F::Output> {
        match self.config.invocation_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| Error::DeadlineExceeded(limit)),
            None => Ok(fut.await),
        }
    }
}

impl<R, B, W, T> SubscriptionService<R, DatasetAuthorizer<B, W>, T>
where
    R: SubscriptionRegistry,
    B: ResourceAuthorizer,
    W: WebhookAuthorizer,
    T: DeliveryTransport,
{
    /// Create a service whose gate is a [`DatasetAuthorizer`] built from
    /// `config.auth`
    pub fn with_authorizers(
        config: ServiceConfig,
        registry: Arc<R>,
        resources: Arc<B>,
        webhooks: Arc<W>,
        transport: Arc<T>,
    ) -> Self {
        let gate = Arc::new(DatasetAuthorizer::with_config(
            resources,
            webhooks,
            config.auth.clone(),
        ));
        Self::new(config, registry, gate, transport)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;

    use super::*;
    use crate::auth::{AccessDecision, AuthServiceError, Credential};
    use crate::broadcast::{ChannelTransport, DeliveryError};
    use crate::registry::{MemoryRegistry, Subscription};
    use crate::testing::{
        fakes, fixed_now, FakeResourceAuthorizer, FakeWebhookAuthorizer, RecordingTransport,
        AUTH_TOKEN, CONNECTION_ID, DATASET_ID, DATETIME_NOW, STREAM_ARN, STREAM_ARN_NO_SUBS,
    };

    type TestService = SubscriptionService<
        MemoryRegistry,
        DatasetAuthorizer<FakeResourceAuthorizer, FakeWebhookAuthorizer>,
        RecordingTransport,
    >;

    fn service(config: ServiceConfig) -> (TestService, Arc<RecordingTransport>) {
        let (resources, webhooks, transport) = fakes();
        let service = SubscriptionService::with_authorizers(
            config,
            Arc::new(MemoryRegistry::new()),
            resources,
            webhooks,
            transport.clone(),
        )
        .with_clock(Arc::new(fixed_now));
        (service, transport)
    }

    fn gateway_connect(connection_id: &str, dataset_id: &str, token: &str) -> String {
        serde_json::json!({
            "requestContext": {"eventType": "CONNECT", "connectionId": connection_id},
            "queryStringParameters": {"dataset_id": dataset_id},
            "headers": {"Authorization": format!("Bearer {}", token)},
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_connect_then_publish() {
        let (service, transport) = service(ServiceConfig::default());

        let outcome = service
            .handle_gateway_request(&gateway_connect(CONNECTION_ID, DATASET_ID, AUTH_TOKEN))
            .await;
        assert_eq!(outcome, Outcome::connected());

        let stored = service.registry().scan().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].connected_at_iso(), DATETIME_NOW);

        let kinesis = serde_json::json!({
            "Records": [
                {"eventSourceARN": STREAM_ARN, "kinesis": {"data": STANDARD.encode(br#"{"hello": "world"}"#)}},
                {"eventSourceARN": STREAM_ARN_NO_SUBS, "kinesis": {"data": STANDARD.encode(br#"{"foo": "bar"}"#)}},
            ]
        })
        .to_string();

        let stats = service.handle_stream_json(&kinesis).await.unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(stats.routed, 2);
        assert_eq!(
            transport.attempts(),
            vec![(
                CONNECTION_ID.to_string(),
                Bytes::from_static(br#"{"hello": "world"}"#)
            )]
        );
    }

    #[tokio::test]
    async fn test_disconnect_stops_delivery() {
        let (service, transport) = service(ServiceConfig::default());

        service
            .handle_connection_event(LifecycleEvent::Connect {
                connection_id: CONNECTION_ID.into(),
                dataset_id: Some(DATASET_ID.into()),
                credential: Some(Credential::Webhook(AUTH_TOKEN.into())),
            })
            .await;
        let outcome = service
            .handle_gateway_request(
                r#"{"requestContext": {"eventType": "DISCONNECT", "connectionId": "UqoGzdQVUkwCljw="}}"#,
            )
            .await;
        assert_eq!(outcome, Outcome::disconnected());

        let stats = service
            .handle_stream_batch(&[StreamRecord::encode(STREAM_ARN, b"late")])
            .await
            .unwrap();

        assert_eq!(stats.deliveries.recipients, 0);
        assert!(transport.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_gateway_request() {
        let (service, _) = service(ServiceConfig::default());

        let outcome = service.handle_gateway_request("{not json").await;
        assert_eq!(outcome, Outcome::new(400, "Bad request"));
        assert!(service.registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_undecodable_stream_batch() {
        let (service, _) = service(ServiceConfig::default());

        let result = service.handle_stream_json("42").await;
        assert!(matches!(result, Err(Error::InvalidEvent(_))));

        let result = service.handle_stream_json(r#"{"Records": "nope"}"#).await;
        assert!(matches!(result, Err(Error::InvalidEvent(_))));
    }

    #[tokio::test]
    async fn test_bad_elements_do_not_sink_batch() {
        let (service, transport) = service(ServiceConfig::default());
        service
            .handle_gateway_request(&gateway_connect(CONNECTION_ID, DATASET_ID, AUTH_TOKEN))
            .await;
        let good = STANDARD.encode(b"good");

        let kinesis = serde_json::json!({
            "Records": [
                {"eventSourceARN": STREAM_ARN, "kinesis": {"data": good}},
                {"eventSourceARN": STREAM_ARN, "kinesis": {}},
                {"eventSourceARN": STREAM_ARN, "kinesis": {"data": good}},
            ]
        })
        .to_string();
        let stats = service.handle_stream_json(&kinesis).await.unwrap();

        assert_eq!(stats.records, 3);
        assert_eq!(stats.routed, 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(transport.attempts().len(), 2);

        let flat = serde_json::json!([
            {"source_id": STREAM_ARN, "payload": good},
            {"source_id": STREAM_ARN},
            [1, 2, 3],
        ])
        .to_string();
        let stats = service.handle_stream_json(&flat).await.unwrap();

        assert_eq!(stats.records, 3);
        assert_eq!(stats.routed, 1);
        assert_eq!(stats.malformed, 2);
        assert_eq!(transport.attempts().len(), 3);
    }

    #[tokio::test]
    async fn test_prune_gone_connections() {
        let (resources, webhooks, _) = fakes();
        let registry = Arc::new(MemoryRegistry::with_subscriptions([
            Subscription::new("conn-gone", DATASET_ID, fixed_now()),
            Subscription::new("conn-live", DATASET_ID, fixed_now()),
        ]));
        let transport =
            Arc::new(RecordingTransport::new().fail_with("conn-gone", DeliveryError::Gone));
        let service = SubscriptionService::with_authorizers(
            ServiceConfig::default().prune_gone_connections(true),
            registry.clone(),
            resources,
            webhooks,
            transport,
        );

        let stats = service
            .handle_stream_batch(&[StreamRecord::encode(STREAM_ARN, b"x")])
            .await
            .unwrap();

        assert_eq!(stats.deliveries.pruned, 1);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get("conn-live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_channel_transport_end_to_end() {
        let (resources, webhooks, _) = fakes();
        let transport = Arc::new(ChannelTransport::new());
        let service = SubscriptionService::with_authorizers(
            ServiceConfig::default(),
            Arc::new(MemoryRegistry::new()),
            resources,
            webhooks,
            transport.clone(),
        );

        let mut rx = transport.attach(CONNECTION_ID).await;
        service
            .handle_gateway_request(&gateway_connect(CONNECTION_ID, DATASET_ID, AUTH_TOKEN))
            .await;
        service
            .handle_stream_batch(&[StreamRecord::encode(STREAM_ARN, b"payload")])
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"payload"));
    }

    struct SlowGate;

    impl AuthorizationGate for SlowGate {
        async fn authorize(
            &self,
            _dataset_id: &str,
            _credential: &Credential,
        ) -> std::result::Result<AccessDecision, AuthServiceError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(AccessDecision::granted())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_deadline() {
        let registry = Arc::new(MemoryRegistry::new());
        let service = SubscriptionService::new(
            ServiceConfig::default().invocation_timeout(Duration::from_secs(1)),
            registry.clone(),
            Arc::new(SlowGate),
            Arc::new(RecordingTransport::new()),
        );

        let outcome = service
            .handle_connection_event(LifecycleEvent::Connect {
                connection_id: CONNECTION_ID.into(),
                dataset_id: Some(DATASET_ID.into()),
                credential: Some(Credential::Bearer(AUTH_TOKEN.into())),
            })
            .await;

        assert_eq!(outcome, Outcome::new(500, "Internal server error"));
        assert!(registry.is_empty().await);
    }
}
