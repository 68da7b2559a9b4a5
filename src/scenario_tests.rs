//! Whole-conversation tests: transcript or capture in, rendered and stored
//! prescription out.

use chrono::NaiveDate;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

use crate::capture::{CaptureEvent, CaptureSession, ScriptedSource, Segment};
use crate::extraction::{SingleValuePolicy, VitalSign};
use crate::prescription::guidance::ALLERGY_WARNING;
use crate::prescription::record::DEFAULT_DIAGNOSIS;
use crate::prescription::Synthesizer;
use crate::presenter::{render_html, render_saved_text, render_text, summary_line};
use crate::storage::RecordStore;
use crate::workflow::ScribeWorkflow;

const FULL_VISIT: &str = "Good morning. Patient name is Sarah Connor. \
    I have had a fever and a bad cough for three days. My temperature is 101.5 today. \
    I am allergic to penicillin. Diagnosis is acute bronchitis. \
    Take Amoxicillin 500 mg twice a day for 7 days. \
    Come back in one week if it does not improve.";

fn visit_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[test]
fn test_full_visit_fills_every_section() {
    let record = Synthesizer::default().synthesize_on(FULL_VISIT, visit_date());

    assert_eq!(record.patient_name, "Sarah Connor");
    assert_eq!(record.diagnosis, "acute bronchitis");
    assert_eq!(
        record.symptoms,
        vec!["I have had a fever and a bad cough for three days"]
    );
    assert_eq!(record.allergies, vec!["I am allergic to penicillin"]);
    assert_eq!(
        record.vitals.get(&VitalSign::Temperature).map(String::as_str),
        Some("101.5")
    );
    assert_eq!(
        record.follow_up,
        "Come back in one week if it does not improve"
    );

    assert_eq!(record.medications.len(), 1);
    let med = &record.medications[0];
    assert_eq!(med.name, "Amoxicillin");
    assert_eq!(med.dosage, "500 mg");
    assert_eq!(med.frequency, "twice a day");
    assert_eq!(med.duration, "for 7 days");

    assert!(record.instructions.contains("Rest and stay hydrated"));
    assert!(record.instructions.contains("Avoid known allergens"));
    assert!(!record.instructions.contains("Avoid strenuous activities"));
    assert!(record.warnings.iter().any(|w| w == ALLERGY_WARNING));
    assert_eq!(record.transcript, FULL_VISIT);
}

#[test]
fn test_full_visit_text_sections_in_order() {
    let record = Synthesizer::default().synthesize_on(FULL_VISIT, visit_date());
    let text = render_text(&record);

    assert!(text.starts_with("PRESCRIPTION SUMMARY\nDate: 2026-10-19\nPatient: Sarah Connor\n"));
    assert!(text.contains("1. Amoxicillin - 500 mg - twice a day - for 7 days"));
    assert!(text.contains("- Temperature: 101.5"));

    let headings = [
        "DIAGNOSIS:",
        "SYMPTOMS:",
        "ALLERGIES:",
        "VITALS:",
        "MEDICATIONS:",
        "INSTRUCTIONS:",
        "FOLLOW-UP:",
        "WARNINGS:",
    ];
    let positions: Vec<usize> = headings
        .iter()
        .map(|h| text.find(h).unwrap_or_else(|| panic!("missing {}", h)))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_symptoms_without_medication_get_suggestions() {
    let transcript = "My stomach has been in pain since yesterday. I also have chest pain.";
    let record = Synthesizer::default().synthesize_on(transcript, visit_date());

    let names: Vec<&str> = record.medications.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Ibuprofen", "Omeprazole"]);
    assert!(record
        .medications
        .iter()
        .all(|m| m.dosage == "As directed by physician"
            && m.frequency == "As prescribed"
            && m.duration == "Until symptoms resolve"));
    assert!(record.instructions.contains("Apply ice or heat as needed"));
    assert_eq!(record.diagnosis, DEFAULT_DIAGNOSIS);
}

#[test]
fn test_decimal_dose_stays_in_one_sentence() {
    let record =
        Synthesizer::default().synthesize_on("Take Metformin 2.5 mg daily.", visit_date());
    assert_eq!(record.medications.len(), 1);
    assert_eq!(record.medications[0].name, "Metformin");
    assert_eq!(record.medications[0].dosage, "2.5 mg");
    assert_eq!(record.medications[0].frequency, "daily");
}

#[test]
fn test_merge_policy_decides_repeated_diagnosis() {
    let transcript = "Diagnosis is migraine. Diagnosis is tension headache.";
    let diagnosis = |policy| {
        Synthesizer::new(policy)
            .synthesize_on(transcript, visit_date())
            .diagnosis
    };

    assert_eq!(diagnosis(SingleValuePolicy::LastMatchWins), "tension headache");
    assert_eq!(diagnosis(SingleValuePolicy::FirstMatchWins), "migraine");
    assert_eq!(
        diagnosis(SingleValuePolicy::Concatenate),
        "migraine; tension headache"
    );
}

#[test]
fn test_later_name_mention_keeps_patient_name() {
    let transcript = "Patient name is John Smith. The medication name is Lisinopril. \
        The patient is Tired today.";
    let record = Synthesizer::default().synthesize_on(transcript, visit_date());
    assert_eq!(record.patient_name, "John Smith");
    assert_eq!(record.medications[0].name, "Lisinopril");
}

#[test]
fn test_markup_in_transcript_is_escaped() {
    let transcript = "Diagnosis is <script>alert('x')</script>";
    let record = Synthesizer::default().synthesize_on(transcript, visit_date());
    assert_eq!(record.diagnosis, "<script>alert('x')</script>");

    let html = render_html(&record);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
}

#[test]
fn test_paused_speech_never_reaches_the_prescription() {
    let dir = TempDir::new().unwrap();
    let mut workflow = ScribeWorkflow::new(
        Synthesizer::default(),
        RecordStore::new(dir.path(), "scenario", 10),
    );

    let mut session = CaptureSession::new();
    session.start("test").unwrap();
    session.handle_event(CaptureEvent::Final(Segment::new(0, 1200, "I have a cough.".into())));
    session.pause().unwrap();
    session.handle_event(CaptureEvent::Final(Segment::new(
        1200,
        2400,
        "Take Ibuprofen 200 mg.".into(),
    )));
    session.resume().unwrap();
    session.handle_event(CaptureEvent::Interim("Come back".into()));
    session.handle_event(CaptureEvent::Final(Segment::new(
        2400,
        4000,
        "Come back in two weeks.".into(),
    )));
    session.stop().unwrap();
    session.handle_event(CaptureEvent::Stopped);

    let transcript = session.finalize().unwrap();
    let record = workflow.generate(&transcript);

    assert_eq!(record.transcript, "I have a cough. Come back in two weeks.");
    assert!(record.medications.is_empty());
    assert_eq!(record.follow_up, "Come back in two weeks");
}

#[tokio::test]
async fn test_scripted_visit_is_saved_and_listed() {
    let dir = TempDir::new().unwrap();
    let mut workflow = ScribeWorkflow::new(
        Synthesizer::default(),
        RecordStore::new(dir.path(), "scenario", 10),
    );

    let script = "Patient name is Omar Haddad.\n\
                  I have a sore throat and a fever.\n\
                  Take Azithromycin 250 mg daily for 5 days.\n";
    let (tx, mut rx) = mpsc::channel(16);
    let mut session = CaptureSession::new();
    let stop_flag: Arc<AtomicBool> = session.start("script").unwrap();
    let handle = ScriptedSource::from_text(script).spawn(tx, stop_flag);

    let record = workflow.record(&mut session, &mut rx).await.unwrap();
    assert_eq!(record.patient_name, "Omar Haddad");
    assert_eq!(record.medications[0].name, "Azithromycin");
    assert_eq!(record.medications[0].duration, "for 5 days");
    handle.await.unwrap();

    let saved = workflow.save_current(Some("Someone Else")).unwrap();
    assert_eq!(saved.record.patient_name, "Omar Haddad");

    let recent = workflow.recent(10).unwrap();
    assert_eq!(recent.len(), 1);
    let line = summary_line(&recent[0]);
    assert!(line.contains("Omar Haddad"));
    assert!(line.contains("Medications: Azithromycin"));
    assert!(line.contains(&saved.id));

    let text = render_saved_text(&recent[0]);
    assert!(text.starts_with("PRESCRIPTION SUMMARY\nDate: "));
    assert!(text.contains("Patient: Omar Haddad"));
}

#[test]
fn test_blank_conversation_is_saved_with_entered_name() {
    let dir = TempDir::new().unwrap();
    let mut workflow = ScribeWorkflow::new(
        Synthesizer::default(),
        RecordStore::new(dir.path(), "scenario", 10),
    );

    workflow.generate("   ");
    let saved = workflow.save_current(Some("  Dana Whitfield ")).unwrap();
    assert_eq!(saved.record.patient_name, "Dana Whitfield");
    assert_eq!(saved.record.diagnosis, "No diagnosis recorded");
    assert_eq!(saved.record.warnings, vec!["Consult physician for proper diagnosis"]);
}
