//! Subscription record
//!
//! The only persisted entity: binds one connection to one dataset.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A connection's subscription to a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Gateway connection id (primary key)
    pub connection_id: String,

    /// Dataset whose records this connection receives (indexed)
    pub dataset_id: String,

    /// When the connect event was accepted
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub connected_at: DateTime<Utc>,
}

impl Subscription {
    /// Create a new subscription record
    pub fn new(
        connection_id: impl Into<String>,
        dataset_id: impl Into<String>,
        connected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            dataset_id: dataset_id.into(),
            connected_at,
        }
    }

    /// ISO-8601 timestamp with microseconds and an explicit `+00:00` offset
    pub fn connected_at_iso(&self) -> String {
        format_timestamp(&self.connected_at)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn serialize_timestamp<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(ts))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}
