pub mod extractors;
pub mod info;
pub mod medication;
pub mod segmenter;

pub use extractors::{clean_sentence, FieldExtractor};
pub use info::{ExtractedInfo, MedicationMention, SingleValuePolicy, VitalSign};
pub use medication::suggest_medications;
pub use segmenter::split_sentences;
