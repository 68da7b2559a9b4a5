pub mod guidance;
pub mod record;
pub mod synthesizer;

pub use record::{Medication, PrescriptionRecord};
pub use synthesizer::Synthesizer;
