use tracing::debug;

use super::info::MedicationMention;

pub const SUGGESTED_DOSAGE: &str = "As directed by physician";
pub const SUGGESTED_FREQUENCY: &str = "As prescribed";
pub const SUGGESTED_DURATION: &str = "Until symptoms resolve";

/// Condition keyword -> candidate drugs, in lookup order.
/// Only the first candidate of a matched condition is ever suggested.
pub const CONDITION_TABLE: &[(&str, &[&str])] = &[
    ("pain", &["Ibuprofen", "Acetaminophen", "Aspirin", "Naproxen"]),
    ("infection", &["Amoxicillin", "Azithromycin", "Ciprofloxacin", "Doxycycline"]),
    ("allergy", &["Cetirizine", "Loratadine", "Diphenhydramine", "Fexofenadine"]),
    ("stomach", &["Omeprazole", "Ranitidine", "Pantoprazole", "Famotidine"]),
    ("anxiety", &["Alprazolam", "Diazepam", "Lorazepam", "Buspirone"]),
    ("depression", &["Sertraline", "Fluoxetine", "Citalopram", "Escitalopram"]),
    ("diabetes", &["Metformin", "Glipizide", "Insulin", "Sitagliptin"]),
    ("blood pressure", &["Lisinopril", "Amlodipine", "Metoprolol", "Losartan"]),
    ("cholesterol", &["Atorvastatin", "Simvastatin", "Rosuvastatin", "Pravastatin"]),
    ("asthma", &["Albuterol", "Budesonide", "Montelukast", "Fluticasone"]),
];

/// Suggest medications for the conditions mentioned in the symptom entries.
///
/// Conditions are matched by substring against the joined, lower-cased
/// symptom text, so the suggestion order follows `CONDITION_TABLE`, not the
/// order in which symptoms were spoken.
pub fn suggest_medications(symptoms: &[String]) -> Vec<MedicationMention> {
    let symptom_text = symptoms.join(" ").to_lowercase();

    let suggestions: Vec<MedicationMention> = CONDITION_TABLE
        .iter()
        .filter(|(condition, _)| symptom_text.contains(condition))
        .filter_map(|(condition, drugs)| {
            drugs.first().map(|drug| {
                debug!(condition = %condition, drug = %drug, "Suggesting medication");
                MedicationMention {
                    name: drug.to_string(),
                    dosage: Some(SUGGESTED_DOSAGE.to_string()),
                    frequency: Some(SUGGESTED_FREQUENCY.to_string()),
                    duration: Some(SUGGESTED_DURATION.to_string()),
                }
            })
        })
        .collect();

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symptoms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pain_suggests_first_candidate() {
        let meds = suggest_medications(&symptoms(&["I have back pain"]));
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].name, "Ibuprofen");
        assert_eq!(meds[0].dosage.as_deref(), Some(SUGGESTED_DOSAGE));
        assert_eq!(meds[0].frequency.as_deref(), Some(SUGGESTED_FREQUENCY));
        assert_eq!(meds[0].duration.as_deref(), Some(SUGGESTED_DURATION));
    }

    #[test]
    fn test_order_follows_table_not_input() {
        let meds = suggest_medications(&symptoms(&[
            "My asthma is worse",
            "Stomach pain after meals",
        ]));
        let names: Vec<&str> = meds.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Ibuprofen", "Omeprazole", "Albuterol"]);
    }

    #[test]
    fn test_multi_word_condition() {
        let meds = suggest_medications(&symptoms(&["Worried about my Blood Pressure"]));
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].name, "Lisinopril");
    }

    #[test]
    fn test_no_matching_condition() {
        assert!(suggest_medications(&symptoms(&["I have a cough"])).is_empty());
        assert!(suggest_medications(&[]).is_empty());
    }

    #[test]
    fn test_every_condition_has_candidates() {
        for (condition, drugs) in CONDITION_TABLE {
            assert!(!drugs.is_empty(), "{} has no candidates", condition);
        }
    }
}
