//! Local relay demo
//!
//! Run with: cargo run --example local_relay [DATASET_ID]
//!
//! Wires the service to an in-memory registry and the in-process channel
//! transport, connects two clients, and pushes a small batch of stream
//! records through it:
//!
//! - `client-a` subscribes with a bearer token
//! - `client-b` subscribes with a webhook token
//! - `client-c` presents a token without access and is rejected
//!
//! Set `RUST_LOG=event_data_subscription=debug` to see per-delivery logs.

use std::sync::Arc;
use std::time::Duration;

use event_data_subscription::auth::{
    AccessDecision, AuthServiceError, Credential, ResourceAuthorizer, WebhookAuthorizer,
};
use event_data_subscription::broadcast::ChannelTransport;
use event_data_subscription::registry::MemoryRegistry;
use event_data_subscription::stream::StreamRecord;
use event_data_subscription::{LifecycleEvent, ServiceConfig, SubscriptionService};

const VALID_TOKEN: &str = "demo-token";

/// Accepts a single hard-coded bearer token
struct DemoResources;

impl ResourceAuthorizer for DemoResources {
    async fn has_access(
        &self,
        token: &str,
        scope: &str,
        resource: &str,
    ) -> Result<bool, AuthServiceError> {
        tracing::debug!(scope = scope, resource = resource, "Checking bearer token");
        Ok(token == VALID_TOKEN)
    }
}

/// Accepts a single hard-coded webhook token for reads
struct DemoWebhooks;

impl WebhookAuthorizer for DemoWebhooks {
    async fn authorize_webhook_token(
        &self,
        dataset_id: &str,
        token: &str,
        operation: &str,
    ) -> Result<AccessDecision, AuthServiceError> {
        if token == VALID_TOKEN && operation == "read" {
            Ok(AccessDecision::granted())
        } else {
            Ok(AccessDecision::denied(format!(
                "Webhook token not valid for {}",
                dataset_id
            )))
        }
    }
}

fn connect(connection_id: &str, dataset_id: &str, credential: Credential) -> LifecycleEvent {
    LifecycleEvent::Connect {
        connection_id: connection_id.to_string(),
        dataset_id: Some(dataset_id.to_string()),
        credential: Some(credential),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dataset_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo-dataset".to_string());

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("event_data_subscription=info".parse()?)
                .add_directive("local_relay=debug".parse()?),
        )
        .init();

    let transport = Arc::new(ChannelTransport::new());
    let service = SubscriptionService::with_authorizers(
        ServiceConfig::default().invocation_timeout(Duration::from_secs(5)),
        Arc::new(MemoryRegistry::new()),
        Arc::new(DemoResources),
        Arc::new(DemoWebhooks),
        Arc::clone(&transport),
    );

    // Attach receivers the way a gateway would hold open sockets
    let mut listeners = Vec::new();
    for client in ["client-a", "client-b"] {
        let mut rx = transport.attach(client).await;
        listeners.push(tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                println!("[{}] <- {}", client, String::from_utf8_lossy(&payload));
            }
        }));
    }

    let events = [
        connect(
            "client-a",
            &dataset_id,
            Credential::Bearer(VALID_TOKEN.into()),
        ),
        connect(
            "client-b",
            &dataset_id,
            Credential::Webhook(VALID_TOKEN.into()),
        ),
        connect("client-c", &dataset_id, Credential::Bearer("nope".into())),
    ];
    for event in events {
        let connection_id = event.connection_id().to_string();
        let outcome = service.handle_connection_event(event).await;
        println!(
            "[{}] connect -> {} {}",
            connection_id, outcome.status_code, outcome.body
        );
    }

    let source_id = format!(
        "arn:aws:kinesis:eu-west-1:123456789101:stream/dp.green.{}.incoming.1.json",
        dataset_id
    );
    let batch = vec![
        StreamRecord::encode(source_id.as_str(), br#"{"temperature": 21.5}"#),
        StreamRecord::encode(source_id.as_str(), br#"{"temperature": 22.0}"#),
        StreamRecord::encode("arn:aws:kinesis:broken", b"ignored"),
    ];

    let stats = service.handle_stream_batch(&batch).await?;
    println!(
        "Batch: {} records, {} routed, {} malformed, {} delivered",
        stats.records, stats.routed, stats.malformed, stats.deliveries.delivered
    );

    for client in ["client-a", "client-b"] {
        let outcome = service
            .handle_connection_event(LifecycleEvent::Disconnect {
                connection_id: client.to_string(),
            })
            .await;
        println!("[{}] disconnect -> {}", client, outcome.body);
        transport.detach(client).await;
    }

    for listener in listeners {
        listener.await?;
    }

    Ok(())
}
