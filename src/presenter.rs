//! Rendering of prescription records to HTML markup and plain text.
//!
//! Both renderings use the same section order. Every string that comes from
//! the transcript is escaped before it is written into markup.

use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

use crate::prescription::{Medication, PrescriptionRecord};
use crate::storage::SavedPrescription;

/// Escape the characters that are significant in HTML text and attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn medication_line(med: &Medication) -> String {
    let mut line = med.name.clone();
    for part in [&med.dosage, &med.frequency, &med.duration] {
        if !part.is_empty() {
            line.push_str(" - ");
            line.push_str(part);
        }
    }
    line
}

fn html_list(html: &mut String, heading: &str, items: &[String]) {
    let _ = writeln!(html, "<div class=\"section\">\n<h4>{}</h4>\n<ul>", heading);
    for item in items {
        let _ = writeln!(html, "<li>{}</li>", escape_html(item));
    }
    html.push_str("</ul>\n</div>\n");
}

fn html_paragraph(html: &mut String, heading: &str, body: &str) {
    let _ = writeln!(
        html,
        "<div class=\"section\">\n<h4>{}</h4>\n<p>{}</p>\n</div>",
        heading, body
    );
}

/// Render a record as an HTML fragment
pub fn render_html(record: &PrescriptionRecord) -> String {
    let mut html = String::new();
    html.push_str("<h3>Prescription Summary</h3>\n");
    let _ = writeln!(
        html,
        "<p><strong>Date:</strong> {}</p>",
        record.date.format("%Y-%m-%d")
    );
    let _ = writeln!(
        html,
        "<p><strong>Patient:</strong> {}</p>",
        escape_html(&record.patient_name)
    );

    html_paragraph(&mut html, "Diagnosis", &escape_html(&record.diagnosis));
    html_list(&mut html, "Symptoms", &record.symptoms);

    if !record.allergies.is_empty() {
        html_list(&mut html, "Allergies", &record.allergies);
    }

    if !record.vitals.is_empty() {
        let vitals: Vec<String> = record
            .vitals
            .iter()
            .map(|(vital, value)| format!("{}: {}", vital, value))
            .collect();
        html_list(&mut html, "Vitals", &vitals);
    }

    if !record.medications.is_empty() {
        html.push_str("<div class=\"section\">\n<h4>Medications</h4>\n<ul>\n");
        for med in &record.medications {
            let mut item = format!("<strong>{}</strong>", escape_html(&med.name));
            for part in [&med.dosage, &med.frequency, &med.duration] {
                if !part.is_empty() {
                    let _ = write!(item, " - {}", escape_html(part));
                }
            }
            let _ = writeln!(html, "<li>{}</li>", item);
        }
        html.push_str("</ul>\n</div>\n");
    }

    let instructions = record
        .instructions
        .lines()
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>");
    html_paragraph(&mut html, "Instructions", &instructions);
    html_paragraph(&mut html, "Follow-up", &escape_html(&record.follow_up));
    html_list(&mut html, "Warnings", &record.warnings);

    html
}

fn text_body(text: &mut String, record: &PrescriptionRecord) {
    let _ = write!(text, "DIAGNOSIS:\n{}\n\n", record.diagnosis);

    text.push_str("SYMPTOMS:\n");
    for symptom in &record.symptoms {
        let _ = writeln!(text, "- {}", symptom);
    }
    text.push('\n');

    if !record.allergies.is_empty() {
        text.push_str("ALLERGIES:\n");
        for allergy in &record.allergies {
            let _ = writeln!(text, "- {}", allergy);
        }
        text.push('\n');
    }

    if !record.vitals.is_empty() {
        text.push_str("VITALS:\n");
        for (vital, value) in &record.vitals {
            let _ = writeln!(text, "- {}: {}", vital, value);
        }
        text.push('\n');
    }

    if !record.medications.is_empty() {
        text.push_str("MEDICATIONS:\n");
        for (index, med) in record.medications.iter().enumerate() {
            let _ = writeln!(text, "{}. {}", index + 1, medication_line(med));
        }
        text.push('\n');
    }

    let _ = write!(text, "INSTRUCTIONS:\n{}\n\n", record.instructions);
    let _ = write!(text, "FOLLOW-UP:\n{}\n\n", record.follow_up);

    text.push_str("WARNINGS:\n");
    for warning in &record.warnings {
        let _ = writeln!(text, "- {}", warning);
    }
}

/// Plain-text export for printing or copying
pub fn render_text(record: &PrescriptionRecord) -> String {
    let mut text = String::from("PRESCRIPTION SUMMARY\n");
    let _ = writeln!(text, "Date: {}", record.date.format("%Y-%m-%d"));
    let _ = write!(text, "Patient: {}\n\n", record.patient_name);
    text_body(&mut text, record);
    text
}

/// Display form of a save timestamp, e.g. "Oct 19, 2026, 09:05 AM"
pub fn format_saved_at(saved_at: &DateTime<Utc>) -> String {
    saved_at
        .with_timezone(&Local)
        .format("%b %-d, %Y, %I:%M %p")
        .to_string()
}

/// Plain-text export of a stored record, dated by its save time
pub fn render_saved_text(saved: &SavedPrescription) -> String {
    let mut text = String::from("PRESCRIPTION SUMMARY\n");
    let _ = writeln!(text, "Date: {}", format_saved_at(&saved.saved_at));
    let _ = write!(text, "Patient: {}\n\n", saved.record.patient_name);
    text_body(&mut text, &saved.record);
    text
}

/// One-line summary used in the recent prescriptions list
pub fn summary_line(saved: &SavedPrescription) -> String {
    let medications = if saved.record.medications.is_empty() {
        "No medications prescribed".to_string()
    } else {
        let names: Vec<&str> = saved
            .record
            .medications
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        format!("Medications: {}", names.join(", "))
    };
    format!(
        "{}  {}  {}  [{}]",
        format_saved_at(&saved.saved_at),
        saved.record.patient_name,
        medications,
        saved.id
    )
}
