//! Stream records and batch envelopes

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

/// One record from the event stream
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamRecord {
    /// Identifier of the stream the record came from
    pub source_id: String,
    /// Base64-encoded record data
    pub payload: String,
}

impl StreamRecord {
    pub fn new(source_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            payload: payload.into(),
        }
    }

    /// Build a record by base64-encoding raw bytes
    pub fn encode(source_id: impl Into<String>, data: &[u8]) -> Self {
        Self::new(source_id, STANDARD.encode(data))
    }

    /// Decode the payload
    pub fn decode_payload(&self) -> Result<Bytes, base64::DecodeError> {
        STANDARD.decode(self.payload.trim()).map(Bytes::from)
    }
}

/// One element of a Kinesis batch: `{"eventSourceARN", "kinesis": {"data"}}`
#[derive(Debug, Clone, Deserialize)]
pub struct KinesisRecord {
    #[serde(rename = "eventSourceARN")]
    pub event_source_arn: String,
    pub kinesis: KinesisData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KinesisData {
    pub data: String,
}

impl From<KinesisRecord> for StreamRecord {
    fn from(record: KinesisRecord) -> Self {
        StreamRecord::new(record.event_source_arn, record.kinesis.data)
    }
}

/// Batch envelope with its elements still undecoded
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BatchEnvelope {
    /// `[{"source_id", "payload"}, ...]`
    Flat(Vec<Value>),
    /// `{"Records": [...]}`
    Kinesis {
        #[serde(rename = "Records")]
        records: Vec<Value>,
    },
}

impl BatchEnvelope {
    /// Number of elements in the batch
    pub fn len(&self) -> usize {
        match self {
            BatchEnvelope::Flat(records) | BatchEnvelope::Kinesis { records } => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode each element on its own, preserving order
    pub fn into_records(self) -> Vec<Result<StreamRecord, serde_json::Error>> {
        match self {
            BatchEnvelope::Flat(records) => records
                .into_iter()
                .map(serde_json::from_value::<StreamRecord>)
                .collect(),
            BatchEnvelope::Kinesis { records } => records
                .into_iter()
                .map(|value| {
                    serde_json::from_value::<KinesisRecord>(value).map(StreamRecord::from)
                })
                .collect(),
        }
    }
}

/// Decode a batch given either as a Kinesis envelope or a flat record array
///
/// Only the envelope shape is checked up front; an element that does not
/// decode comes back as its own `Err` so the rest of the batch survives.
pub fn decode_batch(
    raw: &str,
) -> Result<Vec<Result<StreamRecord, serde_json::Error>>, serde_json::Error> {
    serde_json::from_str::<BatchEnvelope>(raw).map(BatchEnvelope::into_records)
}
