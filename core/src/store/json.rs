use super::SnapshotSource;
use crate::{customer::CustomerRecord, error::DeskResult, snapshot::CustomerSnapshot};
use std::path::PathBuf;

/// A JSON array of customer records, as exported by the data service.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for JsonFileSource {
    fn load_snapshot(&self) -> DeskResult<CustomerSnapshot> {
        let content = std::fs::read_to_string(&self.path)?;
        let mut records: Vec<CustomerRecord> = serde_json::from_str(&content)?;
        // Stable sort: ties keep file order.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        log::info!("store: loaded {} customers from {}", records.len(), self.path.display());
        Ok(CustomerSnapshot::new(chrono::Utc::now(), records))
    }
}
