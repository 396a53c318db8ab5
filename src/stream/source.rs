//! Stream source identifiers
//!
//! A source identifier looks like
//! `arn:aws:kinesis:eu-west-1:123456789101:stream/dp.green.my-dataset.incoming.1.json`:
//! an opaque prefix, a `/`, and a stream name of exactly six dot-separated
//! fields.

use std::fmt;
use std::str::FromStr;

/// Number of dot-separated fields in a stream name
pub const STREAM_NAME_FIELDS: usize = 6;

/// Why a source identifier was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("expected `<prefix>/<stream-name>`")]
    MissingStreamName,
    #[error("stream name has {0} fields, expected 6")]
    FieldCount(usize),
    #[error("stream name field {0} is empty")]
    EmptyField(usize),
}

/// Parsed stream name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSource {
    /// Naming prefix (`dp`)
    pub prefix: String,
    /// Confidentiality level (`green`, `yellow`, `red`)
    pub confidentiality: String,
    /// Dataset the stream carries
    pub dataset_id: String,
    /// Processing stage (`raw`, `incoming`, `processed`)
    pub stage: String,
    /// Dataset version
    pub version: String,
    /// Record format (`json`)
    pub format: String,
}

impl StreamSource {
    /// Parse a full source identifier
    pub fn parse(source_id: &str) -> Result<Self, SourceError> {
        let mut parts = source_id.split('/');
        let (_prefix, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(name), None) if !prefix.is_empty() && !name.is_empty() => {
                (prefix, name)
            }
            _ => return Err(SourceError::MissingStreamName),
        };

        let fields: Vec<&str> = name.split('.').collect();
        if fields.len() != STREAM_NAME_FIELDS {
            return Err(SourceError::FieldCount(fields.len()));
        }
        if let Some(index) = fields.iter().position(|f| f.is_empty()) {
            return Err(SourceError::EmptyField(index));
        }

        Ok(Self {
            prefix: fields[0].to_owned(),
            confidentiality: fields[1].to_owned(),
            dataset_id: fields[2].to_owned(),
            stage: fields[3].to_owned(),
            version: fields[4].to_owned(),
            format: fields[5].to_owned(),
        })
    }
}

impl FromStr for StreamSource {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StreamSource {
    /// Formats the stream name (without the prefix before `/`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}",
            self.prefix, self.confidentiality, self.dataset_id, self.stage, self.version, self.format
        )
    }
}

/// Dataset id carried by a source identifier
pub fn resolve_dataset_id(source_id: &str) -> Result<String, SourceError> {
    StreamSource::parse(source_id).map(|source| source.dataset_id)
}
