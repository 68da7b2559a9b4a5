//! Saved prescription store
//!
//! Records live in one JSON array per namespace:
//! `<store_dir>/<namespace>.json`, newest first.
//!
//! Every write goes to a temporary file in the same directory that is then
//! renamed over the collection, so a failed save leaves the previous
//! collection in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::prescription::PrescriptionRecord;

/// Default number of prescriptions kept per namespace
pub const DEFAULT_MAX_RECORDS: usize = 50;

/// Default collection name
pub const DEFAULT_NAMESPACE: &str = "doctor_patient_prescriptions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode or decode stored prescriptions: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// A prescription as stored: the record plus its identifier and save time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPrescription {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: PrescriptionRecord,
}

/// File-backed prescription store for one namespace
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    max_records: usize,
}

impl RecordStore {
    pub fn new(store_dir: &Path, namespace: &str, max_records: usize) -> Self {
        Self {
            path: store_dir.join(format!("{}.json", namespace)),
            max_records: max_records.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// All stored prescriptions, most recent first
    pub fn list(&self) -> Result<Vec<SavedPrescription>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<SavedPrescription> = serde_json::from_str(&content)?;
        Ok(records)
    }

    pub fn get(&self, id: &str) -> Result<Option<SavedPrescription>, StoreError> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Store a record under a fresh identifier, evicting the oldest records
    /// beyond the retention limit.
    pub fn save(&self, record: PrescriptionRecord) -> Result<SavedPrescription, StoreError> {
        let mut records = self.list()?;

        let saved = SavedPrescription {
            id: Uuid::new_v4().to_string(),
            saved_at: Utc::now(),
            record,
        };
        records.insert(0, saved.clone());

        if records.len() > self.max_records {
            let evicted = records.len() - self.max_records;
            debug!(evicted, max = self.max_records, "Evicting oldest prescriptions");
            records.truncate(self.max_records);
        }

        self.write_all(&records)?;

        info!(
            record_id = %saved.id,
            patient = %saved.record.patient_name,
            stored = records.len(),
            "Prescription saved"
        );
        Ok(saved)
    }

    /// Remove a record; returns false if no record had that identifier
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let records = self.list()?;
        let before = records.len();
        let remaining: Vec<SavedPrescription> =
            records.into_iter().filter(|r| r.id != id).collect();

        if remaining.len() == before {
            warn!(record_id = %id, "Prescription not found for deletion");
            return Ok(false);
        }

        self.write_all(&remaining)?;
        info!(record_id = %id, "Prescription deleted");
        Ok(true)
    }

    /// Drop the whole collection
    pub fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        info!(path = %self.path.display(), "Prescription store cleared");
        Ok(())
    }

    fn write_all(&self, records: &[SavedPrescription]) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(records)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}
