use serde::Serialize;
use std::{collections::BTreeSet, fmt};

use super::{Field, ReservationRecord};
use crate::error::PipelineError;

/// Content hash of a [`Dataset`]: equal contents give equal ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId([u8; 32]);

impl SnapshotId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl Serialize for SnapshotId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Immutable, ordered reservation set loaded once at startup.
///
/// `fields` records which canonical columns the source schema actually had;
/// a field absent from it is a configuration error, not a per-row null.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<ReservationRecord>,
    fields: BTreeSet<Field>,
    snapshot: SnapshotId,
}

impl Dataset {
    pub fn new(records: Vec<ReservationRecord>, fields: impl IntoIterator<Item = Field>) -> Self {
        let fields: BTreeSet<Field> = fields.into_iter().collect();
        let snapshot = hash_contents(&records, &fields);
        Self {
            records,
            fields,
            snapshot,
        }
    }

    /// Dataset whose schema carries every canonical field.
    pub fn from_records(records: Vec<ReservationRecord>) -> Self {
        Self::new(records, Field::ALL)
    }

    pub fn records(&self) -> &[ReservationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }

    /// First canonical field missing from the schema, if any.
    pub fn require_all(&self) -> Result<(), PipelineError> {
        match Field::ALL.iter().find(|f| !self.has_field(**f)) {
            Some(field) => Err(PipelineError::MissingField { field: *field }),
            None => Ok(()),
        }
    }

    pub fn snapshot(&self) -> SnapshotId {
        self.snapshot
    }
}

fn hash_contents(records: &[ReservationRecord], fields: &BTreeSet<Field>) -> SnapshotId {
    let mut hasher = blake3::Hasher::new();
    for field in fields {
        hasher.update(field.as_str().as_bytes());
        hasher.update(&[0]);
    }
    hasher.update(&(records.len() as u64).to_le_bytes());
    for record in records {
        // serde_json output is deterministic for these plain structs
        match serde_json::to_vec(record) {
            Ok(bytes) => {
                hasher.update(&(bytes.len() as u64).to_le_bytes());
                hasher.update(&bytes);
            }
            Err(_) => {
                hasher.update(format!("{:?}", record).as_bytes());
            }
        }
    }
    SnapshotId(*hasher.finalize().as_bytes())
}
