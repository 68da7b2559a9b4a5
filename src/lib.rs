//! Doctor–patient conversation to prescription summary.
//!
//! A finalized transcript is split into sentences, scanned for clinical
//! fields, and assembled into a complete [`prescription::PrescriptionRecord`]
//! that can be rendered, exported, and kept in a small local history.

pub mod capture;
pub mod config;
pub mod extraction;
pub mod prescription;
pub mod presenter;
pub mod storage;
pub mod workflow;

#[cfg(test)]
mod scenario_tests;

pub use config::{Config, OutputFormat};
pub use prescription::{PrescriptionRecord, Synthesizer};
pub use storage::{RecordStore, SavedPrescription, StoreError};
pub use workflow::{ScribeWorkflow, WorkflowError};
