//! Operation records, their kinds and the identity key used for matching

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier assigned to a stored operation by the persistence layer
pub type RecordId = Uuid;

/// Closed set of operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Extraction,
    Validation,
    Rating,
    Classification,
    Analysis,
    Generic,
    TrafficLight,
}

impl OperationKind {
    /// Get all variants in display order
    pub fn all_variants() -> &'static [OperationKind] {
        &[
            OperationKind::Extraction,
            OperationKind::Validation,
            OperationKind::Rating,
            OperationKind::Classification,
            OperationKind::Analysis,
            OperationKind::Generic,
            OperationKind::TrafficLight,
        ]
    }

    /// Wire name used in the tabular format and the database
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Extraction => "extraction",
            OperationKind::Validation => "validation",
            OperationKind::Rating => "rating",
            OperationKind::Classification => "classification",
            OperationKind::Analysis => "analysis",
            OperationKind::Generic => "generic",
            OperationKind::TrafficLight => "traffic_light",
        }
    }

    /// Parse a wire name. Matching is case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        Self::all_variants()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
    }

    /// Comma separated list of every wire name, for error messages
    pub fn allowed_list() -> String {
        Self::all_variants()
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single importable operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Area the operation belongs to
    pub group: String,
    /// Operation name, unique together with `group` for matching
    pub name: String,
    pub kind: OperationKind,
    pub prompt: String,
    #[serde(default)]
    pub description: String,
}

impl Record {
    /// Create a new record
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        kind: OperationKind,
        prompt: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Record {
            group: group.into(),
            name: name.into(),
            kind,
            prompt: prompt.into(),
            description: description.into(),
        }
    }

    /// Identity key used for reconciliation
    pub fn key(&self) -> CandidateKey {
        CandidateKey::new(&self.group, &self.name)
    }

    /// Names of the non-key fields that differ from `other`
    pub fn changed_fields(&self, other: &Record) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.kind != other.kind {
            changed.push("operation_type");
        }
        if self.prompt != other.prompt {
            changed.push("prompt");
        }
        if self.description != other.description {
            changed.push("description");
        }
        changed
    }
}

/// `(group, name)` identity of a record.
///
/// Comparison is exact: no trimming and no case folding. A trailing space in
/// either part makes it a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateKey {
    pub group: String,
    pub name: String,
}

impl CandidateKey {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        CandidateKey {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.name)
    }
}

/// Parses `group/name`, splitting on the first `/`
impl FromStr for CandidateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((group, name)) if !group.is_empty() && !name.is_empty() => {
                Ok(CandidateKey::new(group, name))
            }
            _ => Err(format!("Expected 'group/name', got '{}'", s)),
        }
    }
}

/// An operation as it exists in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub record: Record,
}

/// Authoritative state of one processor: every stored operation plus the
/// display order of its areas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Stored operations, in display order
    pub records: Vec<StoredRecord>,
    /// Area names in display order (includes areas without operations)
    pub group_order: Vec<String>,
}

impl Snapshot {
    /// Plain records without their store ids
    pub fn plain_records(&self) -> Vec<Record> {
        self.records.iter().map(|r| r.record.clone()).collect()
    }
}
