use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extraction::{MedicationMention, VitalSign};

pub const DEFAULT_PATIENT_NAME: &str = "Patient Name";
pub const DEFAULT_DIAGNOSIS: &str = "To be determined";
pub const DEFAULT_SYMPTOMS: &str = "No specific symptoms recorded";
pub const DEFAULT_FOLLOW_UP: &str = "Follow up in 2 weeks or if symptoms persist";

pub const DEFAULT_DOSAGE: &str = "As directed";
pub const DEFAULT_FREQUENCY: &str = "As prescribed";
pub const DEFAULT_DURATION: &str = "Until finished";

pub const EMPTY_DIAGNOSIS: &str = "No diagnosis recorded";
pub const EMPTY_SYMPTOMS: &str = "No symptoms recorded";
pub const EMPTY_INSTRUCTIONS: &str = "No instructions recorded";
pub const EMPTY_FOLLOW_UP: &str = "Schedule follow-up as needed";
pub const EMPTY_WARNING: &str = "Consult physician for proper diagnosis";

/// A medication line on the prescription, every field filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

impl Medication {
    /// Fill the gaps of an extracted mention with the standard defaults
    pub fn from_mention(mention: MedicationMention) -> Self {
        Self {
            name: mention.name,
            dosage: mention.dosage.unwrap_or_else(|| DEFAULT_DOSAGE.to_string()),
            frequency: mention
                .frequency
                .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string()),
            duration: mention
                .duration
                .unwrap_or_else(|| DEFAULT_DURATION.to_string()),
        }
    }
}

/// The drafted prescription summary for one recording session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub patient_name: String,
    /// Date the conversation was captured, not a date spoken in it
    pub date: NaiveDate,
    pub diagnosis: String,
    pub symptoms: Vec<String>,
    pub medications: Vec<Medication>,
    pub instructions: String,
    pub follow_up: String,
    pub warnings: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub vitals: BTreeMap<VitalSign, String>,
    /// Raw transcript kept for audit
    pub transcript: String,
}

impl PrescriptionRecord {
    /// The fixed-placeholder record returned for a blank transcript
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            patient_name: DEFAULT_PATIENT_NAME.to_string(),
            date,
            diagnosis: EMPTY_DIAGNOSIS.to_string(),
            symptoms: vec![EMPTY_SYMPTOMS.to_string()],
            medications: Vec::new(),
            instructions: EMPTY_INSTRUCTIONS.to_string(),
            follow_up: EMPTY_FOLLOW_UP.to_string(),
            warnings: vec![EMPTY_WARNING.to_string()],
            allergies: Vec::new(),
            vitals: BTreeMap::new(),
            transcript: String::new(),
        }
    }

    /// True while the patient name is still the placeholder
    pub fn has_placeholder_name(&self) -> bool {
        self.patient_name == DEFAULT_PATIENT_NAME
    }

    /// Replace the placeholder patient name; an extracted name is kept
    pub fn fill_patient_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if self.has_placeholder_name() && !name.is_empty() {
            self.patient_name = name.to_string();
            true
        } else {
            false
        }
    }

    /// Instruction block split back into its lines
    pub fn instruction_lines(&self) -> impl Iterator<Item = &str> {
        self.instructions.lines().filter(|l| !l.trim().is_empty())
    }
}
