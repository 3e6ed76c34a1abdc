//! Dataset exchanged with remote providers

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Idea;

use super::ProviderResult;

/// The whole idea collection plus the time it was last pushed.
///
/// `unrecognized` holds remote records this build could not decode. They are
/// written back untouched on push so another client's data is never lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteDataset {
    pub ideas: Vec<Idea>,
    pub last_modified: Option<DateTime<Utc>>,
    pub unrecognized: Vec<Value>,
}

impl RemoteDataset {
    #[must_use]
    pub fn new(ideas: Vec<Idea>, last_modified: DateTime<Utc>) -> Self {
        Self {
            ideas,
            last_modified: Some(last_modified),
            unrecognized: Vec::new(),
        }
    }

    /// What a never-written provider returns.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Carry undecoded records over, minus any whose id is now a known idea.
    #[must_use]
    pub fn with_unrecognized(mut self, records: Vec<Value>) -> Self {
        let known = self
            .ideas
            .iter()
            .map(|idea| idea.id.as_str())
            .collect::<HashSet<_>>();
        let records = records
            .into_iter()
            .filter(|record| !record_id(record).is_some_and(|id| known.contains(id)))
            .collect();
        self.unrecognized = records;
        self
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    #[serde(default)]
    ideas: Vec<Value>,
    #[serde(default)]
    last_modified: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDataset {
    ideas: Vec<Value>,
    last_modified: Option<DateTime<Utc>>,
}

/// Decode a JSON dataset, setting aside records that do not decode.
///
/// Another client may have written records this build does not understand;
/// those are logged and kept in `unrecognized` rather than failing the
/// whole fetch.
pub fn decode_dataset(bytes: &[u8]) -> ProviderResult<RemoteDataset> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RemoteDataset::empty());
    }

    let raw: RawDataset = serde_json::from_slice(bytes)?;
    let total = raw.ideas.len();
    let mut ideas = Vec::with_capacity(total);
    let mut unrecognized = Vec::new();
    for value in raw.ideas {
        match Idea::deserialize(&value) {
            Ok(idea) => ideas.push(idea),
            Err(error) => {
                tracing::warn!(
                    "Keeping undecodable remote record {} as is: {error}",
                    record_id(&value).unwrap_or("<no id>")
                );
                unrecognized.push(value);
            }
        }
    }

    if !unrecognized.is_empty() {
        tracing::warn!("Decoded {} of {} remote records", ideas.len(), total);
    }

    Ok(RemoteDataset {
        ideas,
        last_modified: raw.last_modified,
        unrecognized,
    })
}

/// Encode a dataset as pretty-printed JSON.
///
/// Records in `unrecognized` follow the decoded ideas.
pub fn encode_dataset(dataset: &RemoteDataset) -> ProviderResult<Vec<u8>> {
    let mut ideas = dataset
        .ideas
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    ideas.extend(dataset.unrecognized.iter().cloned());
    let wire = WireDataset {
        ideas,
        last_modified: dataset.last_modified,
    };
    Ok(serde_json::to_vec_pretty(&wire)?)
}
