//! Stream ingestion
//!
//! Inbound batches come from an append-only event stream. Each record names
//! its source stream and carries a base64 payload:
//!
//! ```text
//!   source_id: arn:aws:kinesis:...:stream/dp.green.my-dataset.incoming.1.json
//!                                         │   │     │          │        │ │
//!                                    prefix   │  dataset_id    stage    │ format
//!                                    confidentiality                  version
//! ```
//!
//! The router resolves the dataset from the stream name, decodes the payload
//! and passes both to the broadcaster.

pub mod record;
pub mod router;
pub mod source;

pub use record::{decode_batch, BatchEnvelope, KinesisData, KinesisRecord, StreamRecord};
pub use router::RecordRouter;
pub use source::{resolve_dataset_id, SourceError, StreamSource, STREAM_NAME_FIELDS};
