//! Zone and record shapes
//!
//! Both entity kinds mirror what the provider returns. Fields the core does
//! not interpret (ids, TTLs, networks, ...) are kept in a flattened map so
//! that a round trip through the store never drops provider metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A DNS zone hosted by the provider, identified by its apex name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Apex domain of the zone (e.g. "example.com")
    pub zone: String,

    /// Nameservers the provider assigned to the zone
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_servers: Vec<String>,

    /// Opaque provider metadata
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl Zone {
    /// Create a zone carrying only its name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            zone: name.into(),
            dns_servers: Vec::new(),
            meta: Map::new(),
        }
    }

    /// The key this zone is stored under
    pub fn name(&self) -> &str {
        &self.zone
    }
}

/// One answer of a record; multi-field record types (MX, SRV, ...) carry
/// several strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: Vec<String>,

    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl Answer {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            answer: fields,
            meta: Map::new(),
        }
    }
}

/// Composite key of a record: (zone, fully-qualified domain, type)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub zone: String,
    pub domain: String,
    pub record_type: String,
}

impl RecordKey {
    pub fn new(
        zone: impl Into<String>,
        domain: impl Into<String>,
        record_type: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            domain: domain.into(),
            record_type: record_type.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zone, self.domain, self.record_type)
    }
}

/// A typed DNS record scoped to a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub zone: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub record_type: String,

    /// Ordered answers; order is preserved end to end
    #[serde(default)]
    pub answers: Vec<Answer>,

    /// Opaque provider metadata
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl Record {
    /// Create a record with no answers
    pub fn new(key: RecordKey) -> Self {
        Self {
            zone: key.zone,
            domain: key.domain,
            record_type: key.record_type,
            answers: Vec::new(),
            meta: Map::new(),
        }
    }

    /// Create a record from answer-value groups, e.g. `[["1.2.3.4"]]`
    pub fn with_answers(key: RecordKey, groups: Vec<Vec<String>>) -> Self {
        let mut record = Self::new(key);
        record.answers = groups.into_iter().map(Answer::new).collect();
        record
    }

    /// The key this record is stored under
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.zone, &self.domain, &self.record_type)
    }

    /// Whether this record is stored under `key`
    pub fn matches(&self, key: &RecordKey) -> bool {
        self.zone == key.zone && self.domain == key.domain && self.record_type == key.record_type
    }

    /// The answers as plain answer-value groups
    pub fn answer_values(&self) -> Vec<Vec<String>> {
        self.answers.iter().map(|a| a.answer.clone()).collect()
    }
}
