//! Patient instructions and warnings derived from the extracted conditions.

use crate::extraction::ExtractedInfo;

const GENERAL_INSTRUCTIONS: [&str; 2] = [
    "Take medications as prescribed",
    "Complete the full course of medication",
];
const FEVER_INSTRUCTIONS: [&str; 2] = ["Rest and stay hydrated", "Monitor temperature regularly"];
const PAIN_INSTRUCTIONS: [&str; 2] = ["Avoid strenuous activities", "Apply ice or heat as needed"];
const ALLERGY_INSTRUCTIONS: [&str; 2] = ["Avoid known allergens", "Carry antihistamines if prescribed"];
const LIFESTYLE_INSTRUCTIONS: [&str; 2] = ["Maintain a balanced diet", "Get adequate rest"];

const LEADING_WARNINGS: [&str; 2] = [
    "If symptoms worsen or persist, seek immediate medical attention",
    "Do not exceed recommended dosage",
];
pub const ALLERGY_WARNING: &str = "Check medication ingredients for allergens";
const TRAILING_WARNINGS: [&str; 2] = [
    "Keep medications out of reach of children",
    "Do not share medications with others",
];

/// Instruction lines in their fixed order
pub fn instruction_lines(info: &ExtractedInfo) -> Vec<&'static str> {
    let mut lines = GENERAL_INSTRUCTIONS.to_vec();
    if info.symptoms_mention("fever") {
        lines.extend(FEVER_INSTRUCTIONS);
    }
    if info.symptoms_mention("pain") {
        lines.extend(PAIN_INSTRUCTIONS);
    }
    if info.has_allergies() {
        lines.extend(ALLERGY_INSTRUCTIONS);
    }
    lines.extend(LIFESTYLE_INSTRUCTIONS);
    lines
}

/// Instruction lines joined into one block
pub fn generate_instructions(info: &ExtractedInfo) -> String {
    instruction_lines(info).join("\n")
}

pub fn generate_warnings(info: &ExtractedInfo) -> Vec<String> {
    let mut warnings: Vec<&str> = LEADING_WARNINGS.to_vec();
    if info.has_allergies() {
        warnings.push(ALLERGY_WARNING);
    }
    warnings.extend(TRAILING_WARNINGS);
    warnings.into_iter().map(String::from).collect()
}
