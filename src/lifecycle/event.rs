//! Lifecycle events
//!
//! Events arrive either in the flat form
//! `{event_type, connection_id, dataset_id, credential: {bearer, webhook}}`
//! or as the raw WebSocket gateway request, where the dataset and webhook
//! token are query string parameters and the bearer token is in the
//! `Authorization` header.

use std::collections::HashMap;

use serde::Deserialize;

use crate::auth::Credential;

/// Connect event label
pub const CONNECT: &str = "CONNECT";
/// Disconnect event label
pub const DISCONNECT: &str = "DISCONNECT";

/// A connection lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Client wants to subscribe; inputs are validated by the manager
    Connect {
        connection_id: String,
        dataset_id: Option<String>,
        credential: Option<Credential>,
    },
    /// Client went away
    Disconnect { connection_id: String },
    /// Any other label
    Unrecognized {
        connection_id: String,
        event_type: String,
    },
}

impl LifecycleEvent {
    /// Build an event from its label and parts
    pub fn new(
        event_type: &str,
        connection_id: impl Into<String>,
        dataset_id: Option<&str>,
        credential: Option<Credential>,
    ) -> Self {
        let connection_id = connection_id.into();

        match event_type {
            CONNECT => LifecycleEvent::Connect {
                connection_id,
                dataset_id: dataset_id
                    .filter(|d| !d.is_empty())
                    .map(str::to_owned),
                credential,
            },
            DISCONNECT => LifecycleEvent::Disconnect { connection_id },
            other => LifecycleEvent::Unrecognized {
                connection_id,
                event_type: other.to_owned(),
            },
        }
    }

    /// Decode the flat event form
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<ConnectionEventPayload>(raw).map(Self::from)
    }

    /// Decode a raw WebSocket gateway request
    pub fn from_gateway_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<GatewayRequest>(raw).map(Self::from)
    }

    /// Connection the event belongs to
    pub fn connection_id(&self) -> &str {
        match self {
            LifecycleEvent::Connect { connection_id, .. }
            | LifecycleEvent::Disconnect { connection_id }
            | LifecycleEvent::Unrecognized { connection_id, .. } => connection_id,
        }
    }

    /// Event label
    pub fn event_type(&self) -> &str {
        match self {
            LifecycleEvent::Connect { .. } => CONNECT,
            LifecycleEvent::Disconnect { .. } => DISCONNECT,
            LifecycleEvent::Unrecognized { event_type, .. } => event_type,
        }
    }
}

/// Flat lifecycle event
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionEventPayload {
    pub event_type: String,
    pub connection_id: String,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub credential: Option<CredentialPayload>,
}

/// Optional credential parts of a flat event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialPayload {
    #[serde(default)]
    pub bearer: Option<String>,
    #[serde(default)]
    pub webhook: Option<String>,
}

impl From<ConnectionEventPayload> for LifecycleEvent {
    fn from(payload: ConnectionEventPayload) -> Self {
        let parts = payload.credential.unwrap_or_default();
        let credential = Credential::from_parts(parts.bearer.as_deref(), parts.webhook.as_deref());

        LifecycleEvent::new(
            &payload.event_type,
            payload.connection_id,
            payload.dataset_id.as_deref(),
            credential,
        )
    }
}

/// WebSocket gateway route request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    pub request_context: RequestContext,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

/// Connection metadata added by the gateway
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub event_type: String,
    pub connection_id: String,
}

impl GatewayRequest {
    fn query(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|q| q.get(name))
            .map(String::as_str)
    }

    // Header names are case-insensitive.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }
}

impl From<GatewayRequest> for LifecycleEvent {
    fn from(request: GatewayRequest) -> Self {
        let bearer = request
            .header("Authorization")
            .and_then(Credential::bearer_from_header);
        let credential = Credential::from_parts(bearer, request.query("webhook_token"));

        LifecycleEvent::new(
            &request.request_context.event_type,
            request.request_context.connection_id.clone(),
            request.query("dataset_id"),
            credential,
        )
    }
}
