//! Shared test fixtures

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::auth::{AccessDecision, AuthServiceError, ResourceAuthorizer, WebhookAuthorizer};
use crate::broadcast::{DeliveryError, DeliveryTransport};

pub const AUTH_TOKEN: &str = "AbcdefghijklmnoP12345=";
pub const AUTH_TOKEN_UNAUTHORIZED: &str = "eyJhbGciOiJSUzI1N";
pub const AUTH_TOKEN_BAD: &str = "foo";
pub const DATASET_ID: &str = "test-event-subscription";
pub const DATASET_ID_NO_SUBS: &str = "dataset-no-subscriber";
pub const CONNECTION_ID: &str = "UqoGzdQVUkwCljw=";
pub const DATETIME_NOW: &str = "2020-01-01T12:00:00.123456+00:00";
pub const STREAM_ARN: &str =
    "arn:aws:kinesis:eu-west-1:123456789101:stream/dp.green.test-event-subscription.incoming.1.json";
pub const STREAM_ARN_NO_SUBS: &str =
    "arn:aws:kinesis:eu-west-1:123456789101:stream/dp.green.dataset-no-subscriber.incoming.1.json";

pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(DATETIME_NOW)
        .unwrap()
        .with_timezone(&Utc)
}

/// Bearer check: `AUTH_TOKEN` has access, `AUTH_TOKEN_BAD` is a 401,
/// anything else is denied.
#[derive(Default)]
pub struct FakeResourceAuthorizer {
    pub calls: AtomicUsize,
    last: Mutex<Option<(String, String, String)>>,
}

impl FakeResourceAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_call(&self) -> Option<(String, String, String)> {
        self.last.lock().unwrap().clone()
    }
}

impl ResourceAuthorizer for FakeResourceAuthorizer {
    async fn has_access(
        &self,
        token: &str,
        scope: &str,
        resource: &str,
    ) -> Result<bool, AuthServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((token.into(), scope.into(), resource.into()));

        if token == AUTH_TOKEN_BAD {
            return Err(AuthServiceError::with_status(401, "invalid token"));
        }
        Ok(token == AUTH_TOKEN)
    }
}

/// Webhook check: `AUTH_TOKEN` with operation `read` is granted, anything
/// else is denied with reason "Forbidden". Can be scripted to fail first.
#[derive(Default)]
pub struct FakeWebhookAuthorizer {
    pub calls: AtomicUsize,
    failures_left: AtomicU32,
    failure_status: Option<u16>,
}

impl FakeWebhookAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `times` calls with `status` (`None` = transport error)
    pub fn failing(times: u32, status: Option<u16>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures_left: AtomicU32::new(times),
            failure_status: status,
        }
    }
}

impl WebhookAuthorizer for FakeWebhookAuthorizer {
    async fn authorize_webhook_token(
        &self,
        _dataset_id: &str,
        token: &str,
        operation: &str,
    ) -> Result<AccessDecision, AuthServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(match self.failure_status {
                Some(status) => AuthServiceError::with_status(status, "webhook check failed"),
                None => AuthServiceError::transport("connection refused"),
            });
        }

        if token == AUTH_TOKEN && operation == "read" {
            Ok(AccessDecision::granted())
        } else {
            Ok(AccessDecision::denied("Forbidden"))
        }
    }
}

/// Transport recording every attempt, with scripted per-connection failures
#[derive(Default)]
pub struct RecordingTransport {
    attempts: Mutex<Vec<(String, Bytes)>>,
    failures: HashMap<String, DeliveryError>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(mut self, connection_id: &str, error: DeliveryError) -> Self {
        self.failures.insert(connection_id.to_string(), error);
        self
    }

    pub fn attempts(&self) -> Vec<(String, Bytes)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempted_connections(&self) -> Vec<String> {
        self.attempts().into_iter().map(|(id, _)| id).collect()
    }
}

impl DeliveryTransport for RecordingTransport {
    async fn deliver(&self, connection_id: &str, payload: Bytes) -> Result<(), DeliveryError> {
        self.attempts
            .lock()
            .unwrap()
            .push((connection_id.to_string(), payload));

        match self.failures.get(connection_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Shorthand for the shared fixtures behind `Arc`s
pub fn fakes() -> (
    Arc<FakeResourceAuthorizer>,
    Arc<FakeWebhookAuthorizer>,
    Arc<RecordingTransport>,
) {
    (
        Arc::new(FakeResourceAuthorizer::new()),
        Arc::new(FakeWebhookAuthorizer::new()),
        Arc::new(RecordingTransport::new()),
    )
}
