//! Customer snapshot: an immutable, point-in-time view of the record set.
//!
//! Every computation in the desk reads from a snapshot. Reloading from the
//! data service produces a new snapshot; an existing one is never patched.

use crate::customer::CustomerRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub taken_at: DateTime<Utc>,
    records:      Vec<CustomerRecord>,
}

impl CustomerSnapshot {
    /// Records are kept in the order given (the source sorts them).
    pub fn new(taken_at: DateTime<Utc>, records: Vec<CustomerRecord>) -> Self {
        Self { taken_at, records }
    }

    pub fn empty(taken_at: DateTime<Utc>) -> Self {
        Self::new(taken_at, Vec::new())
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CustomerRecord> {
        self.records.iter().find(|c| c.id == id)
    }

    pub fn search(&self, query: &str) -> Vec<&CustomerRecord> {
        self.records.iter().filter(|c| c.matches_search(query)).collect()
    }
}
