//! Keyword and pattern rules, one per clinical field.
//!
//! Every rule looks at a single sentence. Rules are independent of each other
//! and several may fire on the same sentence: "Take Ibuprofen for the pain"
//! is both a medication mention and a symptom.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::info::{ExtractedInfo, MedicationMention, SingleValuePolicy, VitalSign};
use super::segmenter::split_sentences;

const SYMPTOM_KEYWORDS: &[&str] = &[
    "complain", "symptom", "pain", "ache", "fever", "cough", "nausea", "dizz", "fatigue", "weak",
    "sore", "swell", "swollen",
];

const FOLLOW_UP_KEYWORDS: &[&str] = &["follow up", "follow-up", "followup", "return", "come back"];

const DRUG_SUFFIXES: &[&str] = &["in", "ol", "am", "ide", "ate", "ine"];

/// Capitalized words that open ordinary sentences and are never drug names
const NON_DRUG_WORDS: &[&str] = &[
    "after", "also", "and", "apply", "before", "begin", "but", "continue", "doctor", "give",
    "he", "her", "his", "it", "medicine", "medication", "no", "okay", "patient", "please",
    "prescribe", "she", "so", "start", "take", "taking", "that", "the", "then", "they", "this",
    "use", "we", "within", "yes", "you", "your",
];

static PATIENT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\b(?i:patient|name|is)\b:?|:)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)").unwrap()
});

static MEDICATION_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)prescri|medication|medicine|\btak(?:e|es|ing)\b|tablet|capsule|\bdos(?:e|es|age)\b|\d\s*(?:mg|ml|cc)\b|\b(?:mg|ml|cc|milligrams?)\b",
    )
    .unwrap()
});

static CAPITALIZED_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+\b").unwrap());

static DOSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(?:mg|milligrams?|ml|milliliters?|cc)\b").unwrap()
});

static FREQUENCY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:once|twice|three times|four times)\s+(?:a|per)\s+day\b",
        r"(?i)\bevery\s+\d+\s+hours?\b",
        r"(?i)\b(?:daily|bid|tid|qid|prn)\b",
        r"(?i)\b(?:morning|evening|night|bedtime)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:for\s+)?\d+\s+(?:days?|weeks?|months?)\b").unwrap());

static DIAGNOSIS_LEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^.*\bdiagnos(?:is|ed|es|e)\b(?:\s+(?:is|of|was|as|with)\b)?[\s:]*").unwrap()
});

static BLOOD_PRESSURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:blood pressure|\bbp)\b(?:\s+(?:is|of|was|at)\b)?[:\s]+(\d{2,3})\s*(?:/|over)\s*(\d{2,3})\b",
    )
    .unwrap()
});

static TEMPERATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:temperature|\btemp)\b(?:\s+(?:is|of|was|at)\b)?[:\s]+(\d{2,3}(?:\.\d+)?)")
        .unwrap()
});

static HEART_RATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:heart rate|\bpulse|\bhr)\b(?:\s+(?:is|of|was|at)\b)?[:\s]+(\d{2,3})\b")
        .unwrap()
});

static RESPIRATORY_RATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:respiratory rate|respiration rate|\brr)\b(?:\s+(?:is|of|was|at)\b)?[:\s]+(\d{1,2})\b",
    )
    .unwrap()
});

/// Trim a sentence and strip leading/trailing commas, periods and whitespace
pub fn clean_sentence(sentence: &str) -> String {
    sentence
        .trim_matches(|c: char| c == ',' || c == '.' || c.is_whitespace())
        .to_string()
}

/// A sentence with its lower-cased form computed once
struct Sentence<'a> {
    text: &'a str,
    lower: String,
}

impl<'a> Sentence<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_lowercase(),
        }
    }

    fn contains_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.lower.contains(k))
    }

    fn contains_all(&self, keywords: &[&str]) -> bool {
        keywords.iter().all(|k| self.lower.contains(k))
    }
}

/// Patient name following "patient", "name", "is" or a colon.
///
/// Only sentences mentioning both "patient" and "name" are considered, so
/// "the medication name is ..." never replaces the patient's name.
pub fn extract_patient_name(sentence: &str) -> Option<String> {
    let s = Sentence::new(sentence);
    if !s.contains_all(&["patient", "name"]) {
        return None;
    }
    PATIENT_NAME
        .captures(s.text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The cleaned sentence if it mentions a symptom keyword
pub fn extract_symptom(sentence: &str) -> Option<String> {
    let s = Sentence::new(sentence);
    s.contains_any(SYMPTOM_KEYWORDS)
        .then(|| clean_sentence(s.text))
        .filter(|c| !c.is_empty())
}

/// Medication name, dosage, frequency and duration from a medication sentence.
///
/// Returns `None` when the sentence does not talk about medication or when no
/// drug name can be found in it.
pub fn extract_medication(sentence: &str) -> Option<MedicationMention> {
    if !MEDICATION_TRIGGER.is_match(sentence) {
        return None;
    }

    let name = medication_name(sentence)?;
    let mut mention = MedicationMention::new(name);
    mention.dosage = DOSAGE.find(sentence).map(|m| m.as_str().to_string());
    mention.frequency = FREQUENCY_PATTERNS
        .iter()
        .find_map(|re| re.find(sentence))
        .map(|m| m.as_str().to_string());
    mention.duration = DURATION.find(sentence).map(|m| m.as_str().to_string());
    Some(mention)
}

fn medication_name(sentence: &str) -> Option<String> {
    let candidates: Vec<&str> = CAPITALIZED_WORD
        .find_iter(sentence)
        .map(|m| m.as_str())
        .filter(|w| !NON_DRUG_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();

    candidates
        .iter()
        .find(|w| {
            let lower = w.to_lowercase();
            DRUG_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
        })
        .or_else(|| candidates.first())
        .map(|w| w.to_string())
}

/// Diagnosis text with the leading "diagnosis is" phrase stripped
pub fn extract_diagnosis(sentence: &str) -> Option<String> {
    let s = Sentence::new(sentence);
    if !s.contains_any(&["diagnosis", "diagnose"]) {
        return None;
    }
    let stripped = DIAGNOSIS_LEAD.replace(s.text, "");
    let cleaned = clean_sentence(&stripped);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// The cleaned sentence if it mentions an allergy
pub fn extract_allergy(sentence: &str) -> Option<String> {
    let s = Sentence::new(sentence);
    s.contains_any(&["allerg"])
        .then(|| clean_sentence(s.text))
        .filter(|c| !c.is_empty())
}

/// The cleaned sentence if it talks about a follow-up visit
pub fn extract_follow_up(sentence: &str) -> Option<String> {
    let s = Sentence::new(sentence);
    s.contains_any(FOLLOW_UP_KEYWORDS)
        .then(|| clean_sentence(s.text))
        .filter(|c| !c.is_empty())
}

/// All vital readings found in the sentence
pub fn extract_vitals(sentence: &str) -> Vec<(VitalSign, String)> {
    let mut found = Vec::new();

    if let Some(caps) = BLOOD_PRESSURE.captures(sentence) {
        found.push((VitalSign::BloodPressure, format!("{}/{}", &caps[1], &caps[2])));
    }
    if let Some(caps) = TEMPERATURE.captures(sentence) {
        found.push((VitalSign::Temperature, caps[1].to_string()));
    }
    if let Some(caps) = HEART_RATE.captures(sentence) {
        found.push((VitalSign::HeartRate, caps[1].to_string()));
    }
    if let Some(caps) = RESPIRATORY_RATE.captures(sentence) {
        found.push((VitalSign::RespiratoryRate, caps[1].to_string()));
    }

    found
}

/// Runs every field rule over every sentence of a transcript
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor {
    policy: SingleValuePolicy,
}

impl FieldExtractor {
    pub fn new(policy: SingleValuePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SingleValuePolicy {
        self.policy
    }

    /// Build a fresh `ExtractedInfo` from the whole transcript
    pub fn extract(&self, transcript: &str) -> ExtractedInfo {
        let mut info = ExtractedInfo::new();
        for sentence in split_sentences(transcript) {
            self.apply_sentence(&sentence, &mut info);
        }
        info
    }

    /// Apply every rule to one sentence
    pub fn apply_sentence(&self, sentence: &str, info: &mut ExtractedInfo) {
        if let Some(name) = extract_patient_name(sentence) {
            trace!(field = "patient_name", "matched");
            self.policy.merge(&mut info.patient_name, name);
        }
        if let Some(symptom) = extract_symptom(sentence) {
            trace!(field = "symptom", "matched");
            info.symptoms.push(symptom);
        }
        if let Some(mention) = extract_medication(sentence) {
            trace!(field = "medication", name = %mention.name, "matched");
            info.medications.push(mention);
        }
        if let Some(diagnosis) = extract_diagnosis(sentence) {
            trace!(field = "diagnosis", "matched");
            self.policy.merge(&mut info.diagnosis, diagnosis);
        }
        if let Some(allergy) = extract_allergy(sentence) {
            trace!(field = "allergy", "matched");
            info.allergies.push(allergy);
        }
        if let Some(follow_up) = extract_follow_up(sentence) {
            trace!(field = "follow_up", "matched");
            self.policy.merge(&mut info.follow_up, follow_up);
        }
        for (vital, value) in extract_vitals(sentence) {
            trace!(field = "vital", vital = ?vital, "matched");
            info.vitals.insert(vital, value);
        }
    }
}
