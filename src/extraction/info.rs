use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A vital sign slot recognised in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSign {
    BloodPressure,
    Temperature,
    HeartRate,
    RespiratoryRate,
}

impl VitalSign {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BloodPressure => "Blood pressure",
            Self::Temperature => "Temperature",
            Self::HeartRate => "Heart rate",
            Self::RespiratoryRate => "Respiratory rate",
        }
    }
}

impl fmt::Display for VitalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A candidate medication found in one sentence, before defaults are filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationMention {
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
}

impl MedicationMention {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: None,
            frequency: None,
            duration: None,
        }
    }
}

const CONCAT_SEPARATOR: &str = "; ";

/// How repeated matches for a single-valued field (patient name, diagnosis,
/// follow-up) are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleValuePolicy {
    /// Each new match replaces the previous one
    LastMatchWins,
    /// The first match is kept, later ones are ignored
    FirstMatchWins,
    /// Distinct matches are kept in order, joined with "; "
    Concatenate,
}

impl Default for SingleValuePolicy {
    fn default() -> Self {
        Self::LastMatchWins
    }
}

impl SingleValuePolicy {
    /// Merge a freshly extracted value into its slot
    pub fn merge(&self, slot: &mut Option<String>, value: String) {
        match (self, slot.as_mut()) {
            (_, None) => *slot = Some(value),
            (Self::LastMatchWins, Some(_)) => *slot = Some(value),
            (Self::FirstMatchWins, Some(_)) => {}
            (Self::Concatenate, Some(existing)) => {
                if !existing.split(CONCAT_SEPARATOR).any(|part| part == value) {
                    existing.push_str(CONCAT_SEPARATOR);
                    existing.push_str(&value);
                }
            }
        }
    }
}

impl std::str::FromStr for SingleValuePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "last" | "last_match_wins" => Ok(Self::LastMatchWins),
            "first" | "first_match_wins" => Ok(Self::FirstMatchWins),
            "concat" | "concatenate" => Ok(Self::Concatenate),
            _ => Err(format!("Unknown merge policy: {}", s)),
        }
    }
}

/// Working record built up one sentence at a time during extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedInfo {
    pub patient_name: Option<String>,
    pub symptoms: Vec<String>,
    pub medications: Vec<MedicationMention>,
    pub diagnosis: Option<String>,
    pub allergies: Vec<String>,
    pub vitals: BTreeMap<VitalSign, String>,
    pub follow_up: Option<String>,
}

impl ExtractedInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_allergies(&self) -> bool {
        !self.allergies.is_empty()
    }

    /// True if any symptom entry mentions the given lower-case term
    pub fn symptoms_mention(&self, term: &str) -> bool {
        self.symptoms
            .iter()
            .any(|s| s.to_lowercase().contains(term))
    }
}
