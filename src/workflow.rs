//! Controls one user's flow: capture a conversation, draft the prescription,
//! review it, save it.

use anyhow::Result;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::capture::{CaptureEvent, CaptureSession, SessionError};
use crate::config::Config;
use crate::prescription::{PrescriptionRecord, Synthesizer};
use crate::storage::{RecordStore, SavedPrescription, StoreError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No prescription to save")]
    NothingToSave,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ScribeWorkflow {
    synthesizer: Synthesizer,
    store: RecordStore,
    current: Option<PrescriptionRecord>,
}

impl ScribeWorkflow {
    pub fn new(synthesizer: Synthesizer, store: RecordStore) -> Self {
        Self {
            synthesizer,
            store,
            current: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let store = RecordStore::new(
            &config.resolved_store_dir()?,
            &config.namespace,
            config.max_records,
        );
        Ok(Self::new(Synthesizer::new(config.single_value_policy), store))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn current(&self) -> Option<&PrescriptionRecord> {
        self.current.as_ref()
    }

    /// Draft a prescription from a finalized transcript; it becomes the current one
    pub fn generate(&mut self, transcript: &str) -> &PrescriptionRecord {
        if transcript.trim().is_empty() {
            warn!("No transcript available, drafting an empty prescription");
        }
        let record = self.synthesizer.synthesize(transcript);
        self.current.insert(record)
    }

    /// Run a capture session to completion, then draft from its transcript.
    /// Extraction runs once, on the finalized transcript only.
    pub async fn record(
        &mut self,
        session: &mut CaptureSession,
        rx: &mut mpsc::Receiver<CaptureEvent>,
    ) -> Result<&PrescriptionRecord, SessionError> {
        self.current = None;
        let transcript = session.drive(rx).await?;
        Ok(self.generate(&transcript))
    }

    /// Save the current prescription. A placeholder patient name is replaced
    /// by `patient_name` when one is given.
    pub fn save_current(
        &mut self,
        patient_name: Option<&str>,
    ) -> Result<SavedPrescription, WorkflowError> {
        let record = self.current.as_mut().ok_or(WorkflowError::NothingToSave)?;
        if let Some(name) = patient_name {
            if record.fill_patient_name(name) {
                info!("Patient name filled in before saving");
            }
        }
        Ok(self.store.save(record.clone())?)
    }

    /// Make a stored prescription the current one
    pub fn open_saved(&mut self, id: &str) -> Result<Option<&PrescriptionRecord>, StoreError> {
        match self.store.get(id)? {
            Some(saved) => Ok(Some(&*self.current.insert(saved.record))),
            None => Ok(None),
        }
    }

    /// Most recent saved prescriptions, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<SavedPrescription>, StoreError> {
        let mut records = self.store.list()?;
        records.truncate(limit);
        Ok(records)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
