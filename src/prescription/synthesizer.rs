use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use super::guidance::{generate_instructions, generate_warnings};
use super::record::{
    Medication, PrescriptionRecord, DEFAULT_DIAGNOSIS, DEFAULT_FOLLOW_UP, DEFAULT_PATIENT_NAME,
    DEFAULT_SYMPTOMS,
};
use crate::extraction::{suggest_medications, ExtractedInfo, FieldExtractor, SingleValuePolicy};

/// Turns a finalized transcript into a complete prescription record.
///
/// Synthesis never fails: blank input gives the canonical empty record and
/// every field the extractors miss gets its placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer {
    extractor: FieldExtractor,
}

impl Synthesizer {
    pub fn new(policy: SingleValuePolicy) -> Self {
        Self {
            extractor: FieldExtractor::new(policy),
        }
    }

    /// Synthesize with today's local date as the capture date
    pub fn synthesize(&self, transcript: &str) -> PrescriptionRecord {
        self.synthesize_on(transcript, Local::now().date_naive())
    }

    pub fn synthesize_on(&self, transcript: &str, date: NaiveDate) -> PrescriptionRecord {
        if transcript.trim().is_empty() {
            debug!("Blank transcript, returning empty prescription");
            return PrescriptionRecord::empty(date);
        }

        let info = self.extractor.extract(transcript);
        info!(
            words = transcript.split_whitespace().count(),
            symptoms = info.symptoms.len(),
            medications = info.medications.len(),
            allergies = info.allergies.len(),
            vitals = info.vitals.len(),
            has_diagnosis = info.diagnosis.is_some(),
            "Extracted clinical fields from transcript"
        );

        build_record(info, transcript, date)
    }
}

/// Medication list: explicit mentions when there are any, otherwise
/// suggestions for the symptoms, otherwise nothing.
fn resolve_medications(info: &ExtractedInfo) -> Vec<Medication> {
    if !info.medications.is_empty() {
        return info
            .medications
            .iter()
            .cloned()
            .map(Medication::from_mention)
            .collect();
    }
    if info.symptoms.is_empty() {
        return Vec::new();
    }
    suggest_medications(&info.symptoms)
        .into_iter()
        .map(Medication::from_mention)
        .collect()
}

fn build_record(info: ExtractedInfo, transcript: &str, date: NaiveDate) -> PrescriptionRecord {
    let medications = resolve_medications(&info);
    let instructions = generate_instructions(&info);
    let warnings = generate_warnings(&info);

    let symptoms = if info.symptoms.is_empty() {
        vec![DEFAULT_SYMPTOMS.to_string()]
    } else {
        info.symptoms
    };

    PrescriptionRecord {
        patient_name: info
            .patient_name
            .unwrap_or_else(|| DEFAULT_PATIENT_NAME.to_string()),
        date,
        diagnosis: info
            .diagnosis
            .unwrap_or_else(|| DEFAULT_DIAGNOSIS.to_string()),
        symptoms,
        medications,
        instructions,
        follow_up: info
            .follow_up
            .unwrap_or_else(|| DEFAULT_FOLLOW_UP.to_string()),
        warnings,
        allergies: info.allergies,
        vitals: info.vitals,
        transcript: transcript.to_string(),
    }
}
